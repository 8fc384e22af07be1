//! The end-to-end run.

use log::{info, warn};

use mdt_emissions::{EmissionsConfig, EmissionsEngine, EmissionsReport, Scenario};
use mdt_ingest::{SurveyPoint, TopologySource, build_topology_network};
use mdt_match::{FlowIndex, MatchReport, Matcher};
use mdt_network::{FlowMergePolicy, Network, NetworkSummary, simplify, simplify_until_stable};

use crate::{PipelineConfig, PipelineObserver, PipelineResult, Stage};

/// One structural-network input.
pub enum TopologyInput {
    Source(Box<dyn TopologySource>),
    Network(Network),
}

/// A validated set of inputs, ready to [`run`][Self::run].
///
/// Build with [`PipelineBuilder`][crate::PipelineBuilder].
pub struct Pipeline {
    pub(crate) topology:  Vec<TopologyInput>,
    pub(crate) flow:      Network,
    pub(crate) survey:    Option<Vec<SurveyPoint>>,
    pub(crate) emissions: EmissionsConfig,
    pub(crate) config:    PipelineConfig,
}

/// Everything one run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The structural network with flow, mix and emissions attached.
    pub network:    Network,
    pub summary:    NetworkSummary,
    /// Joins made by simplifying the structural network.
    pub joins:      usize,
    /// Joins made by simplifying the flow network.
    pub flow_joins: usize,
    pub matching:   MatchReport,
    pub emissions:  EmissionsReport,
}

impl PipelineOutput {
    /// Rerun the emissions and aggregate stages with another scenario, e.g.
    /// after closing roads or changing modifiers.  The new modifiers act on
    /// the mixes as left by previous runs.
    pub fn recompute(&mut self, config: &EmissionsConfig, scenario: Scenario) -> PipelineResult<&NetworkSummary> {
        scenario.validate()?;
        let engine = EmissionsEngine::new(config, scenario);
        self.emissions = engine.compute_network(&mut self.network, &mut mdt_emissions::NoopObserver);
        self.summary = NetworkSummary::compute(&self.network);
        Ok(&self.summary)
    }
}

impl Pipeline {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build → simplify → match → emissions → aggregate, in sequence.
    ///
    /// # Errors
    ///
    /// Any failed stage stops the run; see [`PipelineError`][crate::PipelineError].
    pub fn run<O: PipelineObserver>(self, observer: &mut O) -> PipelineResult<PipelineOutput> {
        let Pipeline { topology, mut flow, survey, emissions, config } = self;

        // ── Build ─────────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Build);
        let mut network = build_structural(topology, &config)?;
        info!(
            "structural network: {} nodes, {} segments",
            network.node_count(),
            network.segment_count()
        );
        observer.on_stage_end(Stage::Build, &network);

        // ── Simplify ──────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Simplify);
        let joins = if config.simplify_topology {
            run_simplify(&mut network, config.until_stable)?
        } else {
            0
        };
        let flow_joins = if config.simplify_flow {
            run_simplify(&mut flow, config.until_stable)?
        } else {
            0
        };
        info!("simplified: {joins} structural joins, {flow_joins} flow joins");
        observer.on_stage_end(Stage::Simplify, &network);

        // ── Match ─────────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Match);
        let index = if config.match_end_nodes_only {
            FlowIndex::build_end_nodes(&flow)
        } else {
            FlowIndex::build(&flow)
        };
        let matching = Matcher::with_index(&flow, index, survey.as_deref())?.match_network(&mut network);
        observer.on_stage_end(Stage::Match, &network);

        // ── Emissions ─────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Emissions);
        for &id in &config.closed {
            if !network.is_closed(id)? {
                network.toggle_closed(id)?;
            }
        }
        let engine = EmissionsEngine::new(&emissions, config.scenario.clone());
        let emissions_report = engine.compute_network(&mut network, &mut mdt_emissions::NoopObserver);
        observer.on_stage_end(Stage::Emissions, &network);

        // ── Aggregate ─────────────────────────────────────────────────────
        observer.on_stage_start(Stage::Aggregate);
        let summary = NetworkSummary::compute(&network);
        observer.on_stage_end(Stage::Aggregate, &network);
        observer.on_complete(&summary);

        Ok(PipelineOutput { network, summary, joins, flow_joins, matching, emissions: emissions_report })
    }
}

/// Build every topology input and merge them into the first.
fn build_structural(inputs: Vec<TopologyInput>, config: &PipelineConfig) -> PipelineResult<Network> {
    let mut merged: Option<Network> = None;
    for input in inputs {
        let built = match input {
            TopologyInput::Source(mut source) => build_topology_network(source.as_mut(), &config.retry)?,
            TopologyInput::Network(network) => network,
        };
        match merged.as_mut() {
            None => merged = Some(built),
            Some(target) => {
                let added = target.merge(built)?;
                info!("merged topology input: {added} new segments");
            }
        }
    }
    let network = merged.unwrap_or_default();
    if network.is_empty() {
        warn!("structural network is empty");
    }
    Ok(network)
}

fn run_simplify(network: &mut Network, until_stable: bool) -> PipelineResult<usize> {
    let joins = if until_stable {
        simplify_until_stable(network, &FlowMergePolicy)?
    } else {
        simplify(network, &FlowMergePolicy)?
    };
    Ok(joins)
}
