//! Per-run pipeline settings.

use mdt_core::SegmentId;
use mdt_emissions::Scenario;
use mdt_ingest::RetryPolicy;

/// Knobs for one [`Pipeline::run`][crate::Pipeline::run].
///
/// | Field                  | Default                    |
/// |------------------------|----------------------------|
/// | `retry`                | 10 s / 20 s fault delays   |
/// | `scenario`             | `Scenario::default()`      |
/// | `simplify_topology`    | `false`                    |
/// | `simplify_flow`        | `true`                     |
/// | `until_stable`         | `false` (one pass)         |
/// | `match_end_nodes_only` | `false`                    |
/// | `closed`               | none                       |
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub retry:                RetryPolicy,
    pub scenario:             Scenario,
    /// Join degree-2 chains in the structural network before matching.
    pub simplify_topology:    bool,
    /// Join degree-2 chains in the flow network before it is indexed, so
    /// split flow segments match as one merged profile.
    pub simplify_flow:        bool,
    /// Repeat simplification until no join happens instead of one pass.
    pub until_stable:         bool,
    /// Index only flow-network end nodes for matching.
    pub match_end_nodes_only: bool,
    /// Segments to close before the emissions pass.  Ids refer to the network
    /// after simplification.
    pub closed:               Vec<SegmentId>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry:                RetryPolicy::default(),
            scenario:             Scenario::default(),
            simplify_topology:    false,
            simplify_flow:        true,
            until_stable:         false,
            match_end_nodes_only: false,
            closed:               Vec::new(),
        }
    }
}
