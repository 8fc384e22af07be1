//! `mdt.toml`: run settings file, overridable from the command line.
//!
//! ```toml
//! [inputs]
//! overpass_json = ["data/city_centre.json", "data/ring_road.json"]
//! flow          = "data/flow.json"
//! survey        = "data/counts.csv"
//! emissions     = "data/copert_co.toml"   # optional parameter override
//!
//! [pipeline]
//! simplify_flow     = true
//! until_stable      = false
//! closed            = [123456]
//!
//! [retry]
//! too_many_requests_secs = 10
//! gateway_timeout_secs   = 20
//!
//! [scenario]
//! temperature_c = 4.0
//! modifiers     = [1.0, 0.8, 1.0, 1.0, 1.2]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use mdt_core::SegmentId;
use mdt_emissions::Scenario;
use mdt_ingest::RetryPolicy;
use mdt_pipeline::PipelineConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub inputs:   Inputs,
    pub pipeline: PipelineSettings,
    pub retry:    RetrySettings,
    pub scenario: Scenario,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Inputs {
    /// Saved Overpass responses, merged in order.
    pub overpass_json:    Vec<PathBuf>,
    /// Overpass QL query files run against a live endpoint.
    pub overpass_queries: Vec<PathBuf>,
    pub overpass_url:     Option<String>,
    /// OSM PBF extract.
    pub pbf:              Option<PathBuf>,
    pub flow:             Option<PathBuf>,
    pub survey:           Option<PathBuf>,
    pub emissions:        Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub simplify_topology:    bool,
    pub simplify_flow:        bool,
    pub until_stable:         bool,
    pub match_end_nodes_only: bool,
    pub closed:               Vec<u64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let d = PipelineConfig::default();
        Self {
            simplify_topology:    d.simplify_topology,
            simplify_flow:        d.simplify_flow,
            until_stable:         d.until_stable,
            match_end_nodes_only: d.match_end_nodes_only,
            closed:               Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub too_many_requests_secs: u64,
    pub gateway_timeout_secs:   u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let d = RetryPolicy::default();
        Self {
            too_many_requests_secs: d.too_many_requests.as_secs(),
            gateway_timeout_secs:   d.gateway_timeout.as_secs(),
        }
    }
}

impl Settings {
    /// Read `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).with_context(|| format!("parsing {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("{} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            retry: RetryPolicy {
                too_many_requests: Duration::from_secs(self.retry.too_many_requests_secs),
                gateway_timeout:   Duration::from_secs(self.retry.gateway_timeout_secs),
            },
            scenario:             self.scenario.clone(),
            simplify_topology:    self.pipeline.simplify_topology,
            simplify_flow:        self.pipeline.simplify_flow,
            until_stable:         self.pipeline.until_stable,
            match_end_nodes_only: self.pipeline.match_end_nodes_only,
            closed:               self.pipeline.closed.iter().copied().map(SegmentId).collect(),
        }
    }
}
