//! Unit tests for mdt-ingest.
//!
//! All tests use in-memory inputs except the survey file tests, which use a
//! temporary directory.  No test touches the network.

#[cfg(test)]
mod tags {
    use std::collections::HashMap;

    use mdt_core::{RoadClass, SpeedLimit};

    use crate::attributes_from_tags;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_when_absent() {
        let a = attributes_from_tags(&HashMap::new());
        assert_eq!(a.street_name, "unnamed");
        assert_eq!(a.road_class, RoadClass::Unclassified);
        assert_eq!(a.lanes, 2);
        assert_eq!(a.speed_limit, SpeedLimit::Unknown);
        assert_eq!(a.oneway, None);
        assert_eq!(a.width, None);
    }

    #[test]
    fn lanes_estimated_from_class() {
        for (class, lanes) in [("motorway", 6), ("trunk", 4), ("primary", 4), ("secondary", 4),
                               ("tertiary", 2), ("residential", 2), ("service", 2)] {
            let a = attributes_from_tags(&tags(&[("highway", class)]));
            assert_eq!(a.lanes, lanes, "{class}");
        }
    }

    #[test]
    fn explicit_tags_win() {
        let a = attributes_from_tags(&tags(&[
            ("name", "Oxford Road"),
            ("highway", "primary"),
            ("lanes", "3"),
            ("maxspeed", "30 mph"),
            ("oneway", "yes"),
            ("width", "7.5"),
        ]));
        assert_eq!(a.street_name, "Oxford Road");
        assert_eq!(a.road_class, RoadClass::Primary);
        assert_eq!(a.lanes, 3);
        let kmh = a.speed_limit.as_kmh().unwrap();
        assert!((kmh - 48.28032).abs() < 1e-9);
        assert_eq!(a.oneway.as_deref(), Some("yes"));
        assert_eq!(a.width.as_deref(), Some("7.5"));
    }

    #[test]
    fn unparseable_values_fall_back() {
        let a = attributes_from_tags(&tags(&[
            ("highway", "motorway"),
            ("lanes", "2;3"),
            ("maxspeed", "signals"),
        ]));
        assert_eq!(a.lanes, 6);
        assert_eq!(a.speed_limit, SpeedLimit::Unknown);
    }
}

#[cfg(test)]
mod topology {
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    use mdt_core::{GeoPoint, NodeId, SegmentId};

    use crate::{
        BatchSource, IngestError, QueryFault, RawNode, RawWay, RetryPolicy, TopologySource,
        build_topology_network, network_from_ways,
    };

    fn way(id: u64, nodes: &[u64], name: &str) -> RawWay {
        RawWay {
            id,
            nodes: nodes
                .iter()
                .map(|&n| RawNode { id: n, pos: GeoPoint::new(53.0 + n as f64 * 1e-3, -2.0) })
                .collect(),
            tags: HashMap::from([("name".to_string(), name.to_string())]),
        }
    }

    /// Replays a script of results, counting calls.
    struct Scripted {
        script: VecDeque<Result<Option<Vec<RawWay>>, QueryFault>>,
        calls:  usize,
    }

    impl TopologySource for Scripted {
        fn next_batch(&mut self) -> Result<Option<Vec<RawWay>>, QueryFault> {
            self.calls += 1;
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn default_delays() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for(&QueryFault::TooManyRequests), Some(Duration::from_secs(10)));
        assert_eq!(p.delay_for(&QueryFault::GatewayTimeout), Some(Duration::from_secs(20)));
        assert_eq!(p.delay_for(&QueryFault::Other("x".into())), None);
    }

    #[test]
    fn transient_faults_are_retried_without_losing_batches() {
        let mut source = Scripted {
            script: VecDeque::from([
                Ok(Some(vec![way(1, &[1, 2], "a")])),
                Err(QueryFault::TooManyRequests),
                Err(QueryFault::GatewayTimeout),
                Err(QueryFault::TooManyRequests),
                Ok(Some(vec![way(2, &[2, 3], "b")])),
                Ok(None),
            ]),
            calls: 0,
        };
        let net = build_topology_network(&mut source, &RetryPolicy::IMMEDIATE).unwrap();
        assert_eq!(source.calls, 6);
        assert!(net.contains_segment(SegmentId(1)));
        assert!(net.contains_segment(SegmentId(2)));
        assert_eq!(net.node(NodeId(2)).unwrap().degree(), 2);
    }

    #[test]
    fn other_faults_are_reported() {
        let mut source = Scripted {
            script: VecDeque::from([Err(QueryFault::Other("bad query".into()))]),
            calls:  0,
        };
        let err = build_topology_network(&mut source, &RetryPolicy::IMMEDIATE).unwrap_err();
        assert!(matches!(err, IngestError::Query(QueryFault::Other(_))));
    }

    #[test]
    fn batch_source_builds_network() {
        let mut source = BatchSource::new([vec![way(1, &[1, 2, 3], "a")], vec![way(2, &[3, 4], "a")]]);
        let net = build_topology_network(&mut source, &RetryPolicy::IMMEDIATE).unwrap();
        assert_eq!(net.segment_count(), 2);
        assert_eq!(net.node_count(), 4);
        assert_eq!(net.segment(SegmentId(1)).unwrap().attrs.street_name, "a");
    }

    #[test]
    fn degenerate_and_duplicate_ways() {
        let net = network_from_ways(vec![
            way(1, &[1, 2], "first"),
            way(1, &[5, 6], "second"),
            way(2, &[7], "lonely"),
        ])
        .unwrap();
        assert_eq!(net.segment_count(), 1);
        assert_eq!(net.segment(SegmentId(1)).unwrap().attrs.street_name, "first");
        assert!(!net.contains_segment(SegmentId(2)));
    }
}

#[cfg(test)]
mod overpass {
    use mdt_core::GeoPoint;

    use crate::{IngestError, parse_overpass_str};

    const RESULT: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "way", "id": 10, "nodes": [1, 2, 3],
             "tags": {"highway": "residential", "name": "Mill Lane"}},
            {"type": "relation", "id": 99, "members": []},
            {"type": "node", "id": 1, "lat": 53.40, "lon": -2.10},
            {"type": "node", "id": 2, "lat": 53.41, "lon": -2.11},
            {"type": "node", "id": 3, "lat": 53.42, "lon": -2.12}
        ]
    }"#;

    #[test]
    fn ways_resolve_nodes_listed_after_them() {
        let ways = parse_overpass_str(RESULT).unwrap();
        assert_eq!(ways.len(), 1);
        let w = &ways[0];
        assert_eq!(w.id, 10);
        assert_eq!(w.nodes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(w.nodes[1].pos, GeoPoint::new(53.41, -2.11));
        assert_eq!(w.tags.get("name").map(String::as_str), Some("Mill Lane"));
    }

    #[test]
    fn missing_node_is_an_error() {
        let json = r#"{"elements": [{"type": "way", "id": 10, "nodes": [1, 2]},
                                    {"type": "node", "id": 1, "lat": 0.0, "lon": 0.0}]}"#;
        let err = parse_overpass_str(json).unwrap_err();
        assert!(matches!(err, IngestError::MissingNode { way: 10, node: 2 }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_overpass_str("{"), Err(IngestError::Json(_))));
    }
}

#[cfg(all(test, feature = "osm"))]
mod osm {
    use std::collections::HashMap;

    use rustc_hash::FxHashMap;

    use mdt_core::GeoPoint;

    use crate::osm::{is_drivable, resolve_way};

    fn positions() -> FxHashMap<i64, GeoPoint> {
        [(1, GeoPoint::new(53.40, -2.10)), (2, GeoPoint::new(53.41, -2.11)), (3, GeoPoint::new(53.42, -2.12))]
            .into_iter()
            .collect()
    }

    #[test]
    fn resolved_way_keeps_node_order() {
        let way = resolve_way(-7, &[3, 1, 2], HashMap::new(), &positions()).unwrap();
        assert_eq!(way.id, 7);
        assert_eq!(way.nodes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(way.nodes[0].pos, GeoPoint::new(53.42, -2.12));
    }

    #[test]
    fn way_leaving_the_extract_is_skipped() {
        // Dropping node 9 would join 1 and 3 directly.
        assert!(resolve_way(7, &[1, 9, 3], HashMap::new(), &positions()).is_none());
        assert!(resolve_way(7, &[1, 2, 9], HashMap::new(), &positions()).is_none());
    }

    #[test]
    fn drivable_highways() {
        assert!(is_drivable("primary"));
        assert!(is_drivable("residential"));
        assert!(!is_drivable("footway"));
        assert!(!is_drivable("construction"));
    }
}

#[cfg(test)]
mod flow {
    use std::io::Cursor;

    use mdt_core::{GeoPoint, SegmentId};

    use crate::{flow_node_id, load_flow_reader};

    const DATASET: &str = r#"{"network": {"segmentResults": [
        {"segmentId": -501, "streetName": "Oxford Road",
         "shape": [{"latitude": 53.46, "longitude": -2.23},
                   {"latitude": 53.47, "longitude": -2.23}],
         "segmentTimeResults": [
            {"timeSet": 2, "averageSpeed": 31.237, "medianSpeed": 29.004, "sampleSize": 14},
            {"timeSet": 13, "averageSpeed": 20.0, "medianSpeed": 18.0, "sampleSize": 3},
            {"timeSet": 1, "averageSpeed": 99.0, "medianSpeed": 99.0, "sampleSize": 99}
         ]},
        {"segmentId": 502,
         "shape": [{"latitude": 53.47, "longitude": -2.23},
                   {"latitude": 53.48, "longitude": -2.23}]}
    ]}}"#;

    #[test]
    fn segments_nodes_and_hours() {
        let net = load_flow_reader(Cursor::new(DATASET)).unwrap();
        assert_eq!(net.segment_count(), 2);
        assert_eq!(net.node_count(), 3);

        let a = net.segment(SegmentId(501)).unwrap();
        assert_eq!(a.attrs.street_name, "Oxford Road");
        let slots = a.attrs.flow.slots();
        assert_eq!(slots[0].hour, 6);
        assert_eq!(slots[0].mean_speed, 31.24);
        assert_eq!(slots[0].median_speed, 29.0);
        assert_eq!(slots[0].sample_count, 14);
        assert_eq!(slots[11].hour, 17);
        assert_eq!(slots[11].sample_count, 3);
        assert_eq!(a.attrs.flow.total_samples(), 17);

        let b = net.segment(SegmentId(502)).unwrap();
        assert_eq!(b.attrs.street_name, "unnamed");
        assert_eq!(b.attrs.flow.total_samples(), 0);

        // The shared shape point became one node attached to both segments.
        let shared = flow_node_id(GeoPoint::new(53.47, -2.23));
        assert_eq!(net.node(shared).unwrap().degree(), 2);
    }

    #[test]
    fn node_key_is_reproducible() {
        let p = GeoPoint::new(53.46, -2.23);
        assert_eq!(flow_node_id(p), flow_node_id(GeoPoint::new(53.46, -2.23)));
        assert_eq!(flow_node_id(p).get(), ((53.46_f64 * -2.23_f64).abs() * 1e12) as u64);
    }

    #[test]
    fn short_shapes_are_skipped() {
        let json = r#"{"network": {"segmentResults": [
            {"segmentId": 1, "shape": [{"latitude": 1.0, "longitude": 1.0}]},
            {"segmentId": 2, "shape": []},
            {"segmentId": 3, "shape": [{"latitude": 1.0, "longitude": 1.0},
                                       {"latitude": 1.1, "longitude": 1.0}]}]}}"#;
        let net = load_flow_reader(Cursor::new(json)).unwrap();
        assert_eq!(net.segment_count(), 1);
        assert!(net.contains_segment(SegmentId(3)));
        assert!(!net.contains_segment(SegmentId(1)));
        assert_eq!(net.node_count(), 2);
    }
}

#[cfg(test)]
mod survey {
    use std::io::{Cursor, Write};

    use crate::{load_survey_csv, load_survey_reader};

    const CSV: &str = "\
count_point_id,latitude,longitude,two_wheeled_motor_vehicles,cars_and_taxis,buses_and_coaches,lgvs,all_hgvs,all_motor_vehicles
1,53.4794,-2.2453,10,700,20,170,100,1000
2,53.4800,-2.2400,0,0,0,0,0,0
";

    #[test]
    fn proportions_with_residual() {
        let points = load_survey_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(points.len(), 2);

        let mix = points[0].mix.0;
        assert_eq!(mix, [0.01, 0.7, 0.02, 0.17, 0.1]);
        assert!((points[0].mix.sum() - 1.0).abs() < 1e-9);
        assert!(points[1].mix.is_zero());
    }

    #[test]
    fn missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_survey_csv(&dir.path().join("count_points.csv")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn present_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("count_points.csv");
        std::fs::File::create(&path).unwrap().write_all(CSV.as_bytes()).unwrap();
        assert_eq!(load_survey_csv(&path).unwrap().unwrap().len(), 2);
    }

    #[test]
    fn malformed_row_is_an_error() {
        let bad = "latitude,longitude,two_wheeled_motor_vehicles,cars_and_taxis,buses_and_coaches,lgvs,all_motor_vehicles\nx,1,1,1,1,1,5\n";
        assert!(load_survey_reader(Cursor::new(bad)).is_err());
    }
}
