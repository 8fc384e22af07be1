//! Unit tests for mdt-pipeline.
//!
//! Every test drives an in-memory topology source with zero retry delays; no
//! test touches the network or the file system.

#[cfg(test)]
mod helpers {
    use std::collections::{HashMap, VecDeque};

    use mdt_core::{FlowProfile, GeoPoint, HourlyFlow, NodeId, SegmentId, VehicleMix};
    use mdt_ingest::{QueryFault, RawNode, RawWay, RetryPolicy, SurveyPoint, TopologySource};
    use mdt_network::{Network, Segment, SegmentAttributes};

    use crate::PipelineConfig;

    pub fn at(lat: f64) -> GeoPoint {
        GeoPoint::new(lat, 0.0)
    }

    /// Way along the meridian; node `n` sits at lat `n * 0.0005`.
    pub fn way(id: u64, nodes: &[u64]) -> RawWay {
        RawWay {
            id,
            nodes: nodes.iter().map(|&n| RawNode { id: n, pos: at(n as f64 * 0.0005) }).collect(),
            tags: HashMap::from([
                ("name".to_owned(), "High St".to_owned()),
                ("highway".to_owned(), "primary".to_owned()),
                ("maxspeed".to_owned(), "30 mph".to_owned()),
            ]),
        }
    }

    /// Replays a fixed script of batches and faults.
    pub struct Scripted {
        pub script: VecDeque<Result<Option<Vec<RawWay>>, QueryFault>>,
    }

    impl Scripted {
        pub fn new(script: impl IntoIterator<Item = Result<Option<Vec<RawWay>>, QueryFault>>) -> Self {
            Self { script: script.into_iter().collect() }
        }
    }

    impl TopologySource for Scripted {
        fn next_batch(&mut self) -> Result<Option<Vec<RawWay>>, QueryFault> {
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    pub fn observed(speed: f64, count: u32) -> FlowProfile {
        let mut p = FlowProfile::empty();
        for slot in p.slots_mut() {
            *slot = HourlyFlow { mean_speed: speed, median_speed: speed, sample_count: count, ..*slot };
        }
        p
    }

    /// One flow segment, id 100 "High St", over lat 0.0 .. 0.001.
    pub fn flow_network() -> Network {
        let mut net = Network::new();
        net.add_node(NodeId(1), at(0.0));
        net.add_node(NodeId(2), at(0.001));
        let attrs = SegmentAttributes { flow: observed(30.0, 120), ..SegmentAttributes::named("High St") };
        let seg = Segment::new(vec![NodeId(1), NodeId(2)], vec![at(0.0), at(0.001)], attrs).unwrap();
        net.add_segment(SegmentId(100), seg).unwrap();
        net
    }

    /// "High St" over lat 0.0 .. 0.001, split at node 2 into two flow
    /// segments observed at 30 km/h × 10 and 50 km/h × 20.
    pub fn split_flow_network() -> Network {
        let mut net = Network::new();
        for (n, lat) in [(1, 0.0), (2, 0.0005), (3, 0.001)] {
            net.add_node(NodeId(n), at(lat));
        }
        for (id, (a, b), (speed, count)) in [(100, (1, 2), (30.0, 10)), (101, (2, 3), (50.0, 20))] {
            let attrs = SegmentAttributes { flow: observed(speed, count), ..SegmentAttributes::named("High St") };
            let coords = vec![at((a - 1) as f64 * 0.0005), at((b - 1) as f64 * 0.0005)];
            let seg = Segment::new(vec![NodeId(a), NodeId(b)], coords, attrs).unwrap();
            net.add_segment(SegmentId(id), seg).unwrap();
        }
        net
    }

    pub const CARS: VehicleMix = VehicleMix([0.0, 1.0, 0.0, 0.0, 0.0]);

    pub fn survey() -> Option<Vec<SurveyPoint>> {
        Some(vec![SurveyPoint { pos: at(0.0005), mix: CARS }])
    }

    pub fn config() -> PipelineConfig {
        PipelineConfig { retry: RetryPolicy::IMMEDIATE, ..PipelineConfig::default() }
    }
}

// ── Full runs ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use mdt_core::{HOURS, SegmentId};
    use mdt_emissions::{EmissionsConfig, Scenario};
    use mdt_ingest::{BatchSource, QueryFault, network_from_ways};
    use mdt_network::Network;

    use super::helpers::{CARS, Scripted, config, flow_network, split_flow_network, survey, way};
    use crate::{
        NoopObserver, PipelineBuilder, PipelineConfig, PipelineError, PipelineObserver, Stage,
    };

    #[test]
    fn faults_retried_then_full_run() {
        let source = Scripted::new([
            Err(QueryFault::TooManyRequests),
            Ok(Some(vec![way(1, &[0, 1])])),
            Err(QueryFault::GatewayTimeout),
            Ok(Some(vec![way(2, &[1, 2])])),
        ]);
        let output = PipelineBuilder::new()
            .topology_source(source)
            .flow_network(flow_network())
            .survey(survey())
            .config(PipelineConfig { simplify_topology: true, ..config() })
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();

        // Ways 1 and 2 meet at a degree-2 node and share a name.
        assert_eq!(output.joins, 1);
        assert_eq!(output.network.segment_count(), 1);
        assert_eq!(output.matching.named, 1);
        assert_eq!(output.emissions.computed, 1);

        let (id, seg) = output.network.segments().next().unwrap();
        assert_eq!(seg.nodes().len(), 3);
        assert_eq!(seg.attrs.vehicle_mix, CARS);
        assert!(seg.attrs.emissions.iter().all(|&e| e > 0.0));
        assert_eq!(output.summary.segment_count, 1);
        assert_eq!(output.summary.worst_emitter.map(|(w, _)| w), Some(id));
        assert_eq!(output.summary.mean_flow, [120.0; HOURS]);
    }

    #[test]
    fn split_flow_segments_are_merged_before_matching() {
        let output = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 2])]]))
            .flow_network(split_flow_network())
            .config(config())
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();

        assert_eq!(output.flow_joins, 1);
        assert_eq!(output.joins, 0);
        let seg = output.network.segment(SegmentId(1)).unwrap();
        let slot = seg.attrs.flow.slots()[0];
        assert_eq!(slot.mean_speed, 43.33);
        assert_eq!(slot.median_speed, 40.0);
        assert_eq!(slot.sample_count, 20);
    }

    #[test]
    fn flow_simplification_can_be_disabled() {
        let output = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 2])]]))
            .flow_network(split_flow_network())
            .config(PipelineConfig { simplify_flow: false, ..config() })
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();

        assert_eq!(output.flow_joins, 0);
        let slot = output.network.segment(SegmentId(1)).unwrap().attrs.flow.slots()[0];
        assert!(slot.sample_count == 10 || slot.sample_count == 20);
        assert_ne!(slot.mean_speed, 43.33);
    }

    #[test]
    fn other_fault_stops_the_run() {
        let source = Scripted::new([Err(QueryFault::Other("bad request".into()))]);
        let err = PipelineBuilder::new()
            .topology_source(source)
            .flow_network(flow_network())
            .config(config())
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Ingest(_)));
    }

    #[test]
    fn topology_inputs_are_merged() {
        let prebuilt = network_from_ways(vec![way(1, &[0, 1])]).unwrap();
        let output = PipelineBuilder::new()
            .topology_network(prebuilt)
            .topology_source(BatchSource::new([vec![way(1, &[0, 1]), way(2, &[1, 2])]]))
            .flow_network(flow_network())
            .config(PipelineConfig { simplify_topology: false, ..config() })
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();
        assert_eq!(output.joins, 0);
        assert_eq!(output.network.segment_count(), 2);
        assert!(output.network.contains_segment(SegmentId(2)));
    }

    #[test]
    fn closed_segments_are_skipped() {
        let output = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 1]), way(2, &[1, 2])]]))
            .flow_network(flow_network())
            .survey(survey())
            .config(PipelineConfig { simplify_topology: false, closed: vec![SegmentId(1)], ..config() })
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();

        assert_eq!(output.emissions.closed, 1);
        assert_eq!(output.network.segment(SegmentId(1)).unwrap().attrs.emissions, [0.0; HOURS]);
        assert!(output.network.segment(SegmentId(2)).unwrap().attrs.emissions[0] > 0.0);
        assert_eq!(output.summary.worst_emitter.map(|(w, _)| w), Some(SegmentId(2)));
    }

    #[test]
    fn unknown_closure_is_an_error() {
        let err = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 1])]]))
            .flow_network(flow_network())
            .config(PipelineConfig { closed: vec![SegmentId(99)], ..config() })
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Network(_)));
    }

    #[test]
    fn empty_flow_network_is_a_match_error() {
        let err = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 1])]]))
            .flow_network(Network::new())
            .config(config())
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Match(_)));
    }

    #[test]
    fn recompute_with_modifiers() {
        let mut output = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 2])]]))
            .flow_network(flow_network())
            .survey(survey())
            .config(config())
            .build()
            .unwrap()
            .run(&mut NoopObserver)
            .unwrap();
        assert!(output.summary.worst_emitter.is_some());

        // Removing every car leaves nothing to emit; the zero mix is not stored.
        let scenario = Scenario::default().with_modifiers([1.0, 0.0, 1.0, 1.0, 1.0]);
        let summary = output.recompute(&EmissionsConfig::default(), scenario).unwrap();
        assert_eq!(summary.worst_emitter, None);
        assert_eq!(summary.mean_emissions, [0.0; HOURS]);
        assert_eq!(output.network.segment(SegmentId(1)).unwrap().attrs.vehicle_mix, CARS);
    }

    #[derive(Default)]
    struct Recorder {
        started:  Vec<Stage>,
        ended:    Vec<Stage>,
        complete: usize,
    }

    impl PipelineObserver for Recorder {
        fn on_stage_start(&mut self, stage: Stage) {
            self.started.push(stage);
        }
        fn on_stage_end(&mut self, stage: Stage, _network: &Network) {
            self.ended.push(stage);
        }
        fn on_complete(&mut self, _summary: &mdt_network::NetworkSummary) {
            self.complete += 1;
        }
    }

    #[test]
    fn observer_sees_stages_in_order() {
        let mut recorder = Recorder::default();
        PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 2])]]))
            .flow_network(flow_network())
            .config(config())
            .build()
            .unwrap()
            .run(&mut recorder)
            .unwrap();
        assert_eq!(recorder.started, Stage::ALL);
        assert_eq!(recorder.ended, Stage::ALL);
        assert_eq!(recorder.complete, 1);
    }
}

// ── Builder validation ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use mdt_emissions::{EmissionsConfig, Scenario};
    use mdt_ingest::BatchSource;

    use super::helpers::{config, flow_network, way};
    use crate::{PipelineBuilder, PipelineConfig, PipelineError};

    #[test]
    fn topology_required() {
        let err = PipelineBuilder::new().flow_network(flow_network()).build().err();
        assert!(matches!(err, Some(PipelineError::MissingInput("topology"))));
    }

    #[test]
    fn flow_required() {
        let err = PipelineBuilder::new().topology_source(BatchSource::default()).build().err();
        assert!(matches!(err, Some(PipelineError::MissingInput("flow network"))));
    }

    #[test]
    fn invalid_scenario_rejected() {
        let bad = PipelineConfig { scenario: Scenario::default().with_petrol_share(2.0), ..config() };
        let err = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 1])]]))
            .flow_network(flow_network())
            .config(bad)
            .build()
            .err();
        assert!(matches!(err, Some(PipelineError::Emissions(_))));
    }

    #[test]
    fn invalid_parameter_table_rejected() {
        let mut table = EmissionsConfig::default();
        table.heavy_goods.factors.clear();
        let err = PipelineBuilder::new()
            .topology_source(BatchSource::new([vec![way(1, &[0, 1])]]))
            .flow_network(flow_network())
            .emissions(table)
            .build()
            .err();
        assert!(matches!(err, Some(PipelineError::Emissions(_))));
    }
}
