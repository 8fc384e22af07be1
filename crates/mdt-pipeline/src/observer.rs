//! Pipeline progress hooks.

use std::fmt;

use mdt_network::{Network, NetworkSummary};

/// The sequential phases of one run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Build,
    Simplify,
    Match,
    Emissions,
    Aggregate,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Self::Build, Self::Simplify, Self::Match, Self::Emissions, Self::Aggregate];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Build     => "build",
            Self::Simplify  => "simplify",
            Self::Match     => "match",
            Self::Emissions => "emissions",
            Self::Aggregate => "aggregate",
        };
        f.write_str(s)
    }
}

/// Callbacks invoked by [`Pipeline::run`][crate::Pipeline::run].
///
/// All methods have default no-op implementations.
pub trait PipelineObserver {
    /// Called before a stage starts.
    fn on_stage_start(&mut self, _stage: Stage) {}

    /// Called after a stage completes, with read access to the network.
    fn on_stage_end(&mut self, _stage: Stage, _network: &Network) {}

    /// Called once with the final summary.
    fn on_complete(&mut self, _summary: &NetworkSummary) {}
}

/// A [`PipelineObserver`] that does nothing.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
