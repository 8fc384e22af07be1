//! Fluent builder for constructing a [`Pipeline`].

use mdt_emissions::EmissionsConfig;
use mdt_ingest::{SurveyPoint, TopologySource};
use mdt_network::Network;

use crate::{Pipeline, PipelineConfig, PipelineError, PipelineResult, TopologyInput};

/// Fluent builder for [`Pipeline`].
///
/// # Required inputs
///
/// - at least one topology input: [`topology_source`][Self::topology_source]
///   or [`topology_network`][Self::topology_network]
/// - the flow network, from [`mdt_ingest::load_flow_json`]
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                       |
/// |------------------------|-------------------------------|
/// | `.survey(points)`      | none; vehicle mixes stay zero |
/// | `.emissions(config)`   | `EmissionsConfig::default()`  |
/// | `.config(config)`      | `PipelineConfig::default()`   |
///
/// Several topology inputs are built separately and merged in the order
/// given; a segment or node id already present wins.
///
/// # Example
///
/// ```rust,ignore
/// let output = PipelineBuilder::new()
///     .topology_network(load_overpass_json(path).and_then(network_from_ways)?)
///     .flow_network(load_flow_json(flow_path)?)
///     .survey(load_survey_csv(survey_path)?)
///     .build()?
///     .run(&mut NoopObserver)?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    topology:  Vec<TopologyInput>,
    flow:      Option<Network>,
    survey:    Option<Vec<SurveyPoint>>,
    emissions: Option<EmissionsConfig>,
    config:    Option<PipelineConfig>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topology source, drained with retry when the pipeline runs.
    pub fn topology_source(mut self, source: impl TopologySource + 'static) -> Self {
        self.topology.push(TopologyInput::Source(Box::new(source)));
        self
    }

    /// Add an already-built structural network.
    pub fn topology_network(mut self, network: Network) -> Self {
        self.topology.push(TopologyInput::Network(network));
        self
    }

    pub fn flow_network(mut self, flow: Network) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Supply survey points.  `None` (a missing survey file) is accepted and
    /// leaves vehicle mixes at zero.
    pub fn survey(mut self, points: Option<Vec<SurveyPoint>>) -> Self {
        self.survey = points;
        self
    }

    pub fn emissions(mut self, config: EmissionsConfig) -> Self {
        self.emissions = Some(config);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate inputs and return a ready-to-run [`Pipeline`].
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingInput`] without topology or flow input;
    /// [`PipelineError::Emissions`] for an invalid parameter table or scenario.
    pub fn build(self) -> PipelineResult<Pipeline> {
        if self.topology.is_empty() {
            return Err(PipelineError::MissingInput("topology"));
        }
        let flow = self.flow.ok_or(PipelineError::MissingInput("flow network"))?;

        let emissions = self.emissions.unwrap_or_default();
        emissions.validate()?;
        let config = self.config.unwrap_or_default();
        config.scenario.validate()?;

        Ok(Pipeline {
            topology: self.topology,
            flow,
            survey: self.survey,
            emissions,
            config,
        })
    }
}
