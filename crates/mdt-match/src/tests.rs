//! Unit tests for mdt-match.
//!
//! Geometry is laid out along the meridian (lon 0) with uneven spacing so no
//! two nodes are equidistant from a query point.

#[cfg(test)]
mod helpers {
    use mdt_core::{FlowProfile, GeoPoint, HourlyFlow, NodeId, SegmentId, VehicleMix};
    use mdt_ingest::SurveyPoint;
    use mdt_network::{Network, Segment, SegmentAttributes};

    pub fn at(lat: f64) -> GeoPoint {
        GeoPoint::new(lat, 0.0)
    }

    pub fn observed(count: u32) -> FlowProfile {
        let mut p = FlowProfile::empty();
        for slot in p.slots_mut() {
            *slot = HourlyFlow { mean_speed: 30.0, median_speed: 28.0, sample_count: count, ..*slot };
        }
        p
    }

    /// Flow network:
    ///
    /// ```text
    ///   node   1        2         3          4
    ///   lat    0.0      0.0011    0.0023     0.0036
    ///          |---- 200 "Wrong St" ----|--- 100 "High St" ---|
    /// ```
    pub fn flow_network(high_st: FlowProfile) -> Network {
        let mut net = Network::new();
        for (id, lat) in [(1, 0.0), (2, 0.0011), (3, 0.0023), (4, 0.0036)] {
            net.add_node(NodeId(id), at(lat));
        }
        let wrong = SegmentAttributes { flow: observed(50), ..SegmentAttributes::named("Wrong St") };
        let high = SegmentAttributes { flow: high_st, ..SegmentAttributes::named("High St") };
        net.add_segment(
            SegmentId(200),
            Segment::new(vec![NodeId(1), NodeId(2), NodeId(3)], vec![at(0.0), at(0.0011), at(0.0023)], wrong)
                .unwrap(),
        )
        .unwrap();
        net.add_segment(
            SegmentId(100),
            Segment::new(vec![NodeId(3), NodeId(4)], vec![at(0.0023), at(0.0036)], high).unwrap(),
        )
        .unwrap();
        net
    }

    /// One "High St" segment over lat 0.0 .. 0.001.
    pub fn structural() -> Network {
        let mut net = Network::new();
        net.add_node(NodeId(11), at(0.0));
        net.add_node(NodeId(12), at(0.001));
        let seg = Segment::new(
            vec![NodeId(11), NodeId(12)],
            vec![at(0.0), at(0.001)],
            SegmentAttributes::named("High St"),
        )
        .unwrap();
        net.add_segment(SegmentId(1), seg).unwrap();
        net
    }

    pub const NEAR_MIX: VehicleMix = VehicleMix([0.1, 0.6, 0.1, 0.1, 0.1]);
    pub const FAR_MIX: VehicleMix = VehicleMix([0.0, 1.0, 0.0, 0.0, 0.0]);

    pub fn survey() -> Vec<SurveyPoint> {
        vec![
            SurveyPoint { pos: GeoPoint::new(1.0, 1.0), mix: FAR_MIX },
            SurveyPoint { pos: at(0.0002), mix: NEAR_MIX },
        ]
    }
}

#[cfg(test)]
mod ranking {
    use mdt_core::{GeoPoint, SegmentId};

    use crate::{rank_candidates, representative_point};

    const A: SegmentId = SegmentId(10);
    const B: SegmentId = SegmentId(20);
    const C: SegmentId = SegmentId(30);

    #[test]
    fn equal_counts_keep_first_encountered() {
        let ranked = rank_candidates([A, B, C, B, A, A, B]);
        assert_eq!(ranked, vec![A, B, C]);
    }

    #[test]
    fn count_beats_encounter_order() {
        let ranked = rank_candidates([C, A, B, B]);
        assert_eq!(ranked, vec![B, C, A]);
    }

    #[test]
    fn empty_input() {
        assert!(rank_candidates(std::iter::empty()).is_empty());
    }

    #[test]
    fn representative_point_odd_and_even() {
        let pts: Vec<GeoPoint> = (0..7).map(|i| GeoPoint::new(i as f64, 0.0)).collect();
        assert_eq!(representative_point(&pts[..1]), Some(pts[0]));
        assert_eq!(representative_point(&pts[..2]), Some(pts[0]));
        assert_eq!(representative_point(&pts[..3]), Some(pts[1]));
        assert_eq!(representative_point(&pts[..4]), Some(pts[1]));
        assert_eq!(representative_point(&pts[..5]), Some(pts[2]));
        assert_eq!(representative_point(&pts[..6]), Some(pts[2]));
        assert_eq!(representative_point(&pts[..7]), Some(pts[3]));
        assert_eq!(representative_point(&[]), None);
    }
}

#[cfg(test)]
mod index {
    use mdt_core::NodeId;

    use super::helpers::{NEAR_MIX, at, flow_network, observed, survey};
    use crate::{FlowIndex, SurveyIndex};

    #[test]
    fn nearest_nodes_closest_first() {
        let net = flow_network(observed(1));
        let index = FlowIndex::build(&net);
        assert_eq!(index.len(), 4);
        assert_eq!(index.nearest(at(0.001), 3), vec![NodeId(2), NodeId(1), NodeId(3)]);
        assert_eq!(index.nearest(at(0.001), 10).len(), 4);
    }

    #[test]
    fn end_node_index_skips_interior_nodes() {
        let net = flow_network(observed(1));
        let index = FlowIndex::build_end_nodes(&net);
        assert_eq!(index.len(), 3);
        assert!(!index.nearest(at(0.0011), 3).contains(&NodeId(2)));
    }

    #[test]
    fn nearest_survey_mix() {
        let index = SurveyIndex::build(&survey());
        assert_eq!(index.nearest_mix(at(0.0)), Some(NEAR_MIX));
        assert_eq!(SurveyIndex::build(&[]).nearest_mix(at(0.0)), None);
    }
}

#[cfg(test)]
mod matcher {
    use mdt_core::{FlowProfile, NodeId, SegmentId, VehicleMix};
    use mdt_network::Network;

    use super::helpers::{NEAR_MIX, at, flow_network, observed, structural, survey};
    use crate::{FlowMatch, MatchError, Matcher};

    #[test]
    fn empty_flow_network_is_an_error() {
        let empty = Network::new();
        assert!(matches!(Matcher::new(&empty, None), Err(MatchError::EmptyFlowNetwork)));
    }

    #[test]
    fn candidates_ranked_by_votes() {
        let flow = flow_network(observed(5));
        let target = structural();
        let matcher = Matcher::new(&flow, None).unwrap();
        let seg = target.segment(SegmentId(1)).unwrap();
        assert_eq!(matcher.candidates(seg), vec![SegmentId(200), SegmentId(100)]);
    }

    #[test]
    fn same_name_and_fully_observed_wins() {
        let flow = flow_network(observed(5));
        let target = structural();
        let matcher = Matcher::new(&flow, None).unwrap();
        let seg = target.segment(SegmentId(1)).unwrap();
        assert_eq!(matcher.flow_match(seg), FlowMatch::Named(SegmentId(100)));
    }

    #[test]
    fn partially_observed_name_match_falls_back() {
        let mut partial = observed(5);
        partial.slots_mut()[4].sample_count = 0;
        let flow = flow_network(partial);
        let target = structural();
        let matcher = Matcher::new(&flow, None).unwrap();
        let seg = target.segment(SegmentId(1)).unwrap();
        assert_eq!(matcher.flow_match(seg), FlowMatch::Fallback(SegmentId(200)));
    }

    #[test]
    fn match_network_copies_flow_and_mix() {
        let flow = flow_network(observed(5));
        let mut target = structural();
        let points = survey();
        let report = Matcher::new(&flow, Some(&points)).unwrap().match_network(&mut target);

        assert_eq!(report.segments, 1);
        assert_eq!(report.named, 1);
        assert_eq!(report.mixed, 1);
        let attrs = &target.segment(SegmentId(1)).unwrap().attrs;
        assert_eq!(attrs.flow, observed(5));
        assert_eq!(attrs.vehicle_mix, NEAR_MIX);
    }

    #[test]
    fn unobserved_flow_gets_zero_mix() {
        let mut flow = flow_network(FlowProfile::empty());
        flow.segment_mut(SegmentId(200)).unwrap().attrs.flow = FlowProfile::empty();
        let mut target = structural();
        let points = survey();
        let report = Matcher::new(&flow, Some(&points)).unwrap().match_network(&mut target);

        assert_eq!(report.fallback, 1);
        assert_eq!(report.mixed, 0);
        assert_eq!(target.segment(SegmentId(1)).unwrap().attrs.vehicle_mix, VehicleMix::ZERO);
    }

    #[test]
    fn missing_survey_leaves_zero_mix() {
        let flow = flow_network(observed(5));
        let mut target = structural();
        let report = Matcher::new(&flow, None).unwrap().match_network(&mut target);
        assert_eq!(report.named, 1);
        assert!(target.segment(SegmentId(1)).unwrap().attrs.vehicle_mix.is_zero());
    }

    #[test]
    fn isolated_flow_nodes_leave_segment_unmatched() {
        let mut flow = Network::new();
        flow.add_node(NodeId(1), at(0.0));
        let mut target = structural();
        target.segment_mut(SegmentId(1)).unwrap().attrs.flow = observed(9);
        let points = survey();
        let report = Matcher::new(&flow, Some(&points)).unwrap().match_network(&mut target);

        assert_eq!(report.unmatched, 1);
        let attrs = &target.segment(SegmentId(1)).unwrap().attrs;
        assert_eq!(attrs.flow, FlowProfile::empty());
        assert!(attrs.vehicle_mix.is_zero());
    }
}
