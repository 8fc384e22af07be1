//! Flow and vehicle-mix matching.
//!
//! # Flow match
//!
//! For every coordinate of a structural segment the [`FlowIndex`] returns the
//! [`NEAREST_NODES`] closest flow nodes; every segment attached to those nodes
//! is one vote.  Candidates are ranked by votes, most first, ties in the order
//! first seen.  The first candidate with the same street name and an
//! observation in every hour wins; otherwise the top-ranked candidate is used
//! regardless.
//!
//! # Vehicle-mix match
//!
//! Only segments whose matched flow has a nonzero sample total get a mix: the
//! nearest survey point to the segment's [`representative_point`].  Everything
//! else gets the all-zero mix.

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use mdt_core::{FlowProfile, GeoPoint, SegmentId, VehicleMix};
use mdt_ingest::SurveyPoint;
use mdt_network::{Network, Segment};

use crate::{FlowIndex, MatchError, MatchResult, SurveyIndex};

/// Flow nodes queried per structural coordinate.
pub const NEAREST_NODES: usize = 3;

/// Distinct candidates ordered by occurrence count, most frequent first.
/// Equal counts keep first-encountered order.
pub fn rank_candidates<I>(candidates: I) -> Vec<SegmentId>
where
    I: IntoIterator<Item = SegmentId>,
{
    let mut tally: FxHashMap<SegmentId, (usize, usize)> = FxHashMap::default();
    for (seen, id) in candidates.into_iter().enumerate() {
        tally.entry(id).or_insert((0, seen)).0 += 1;
    }
    let mut ranked: Vec<(SegmentId, usize, usize)> =
        tally.into_iter().map(|(id, (count, first))| (id, count, first)).collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(id, _, _)| id).collect()
}

/// The coordinate used for the survey lookup: the middle one for an odd
/// count, the one just before the midpoint for an even count.
pub fn representative_point(coords: &[GeoPoint]) -> Option<GeoPoint> {
    if coords.is_empty() {
        return None;
    }
    let n = coords.len();
    let i = if n % 2 == 1 { n / 2 } else { n / 2 - 1 };
    Some(coords[i])
}

/// How a structural segment was matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowMatch {
    /// Same street name and fully observed.
    Named(SegmentId),
    /// Most frequent candidate, taken unconditionally.
    Fallback(SegmentId),
    /// No flow node near any coordinate.
    Unmatched,
}

impl FlowMatch {
    pub fn segment(self) -> Option<SegmentId> {
        match self {
            Self::Named(id) | Self::Fallback(id) => Some(id),
            Self::Unmatched => None,
        }
    }
}

/// Counts from one [`Matcher::match_network`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchReport {
    pub segments:   usize,
    pub named:      usize,
    pub fallback:   usize,
    pub unmatched:  usize,
    /// Segments that received a survey mix.
    pub mixed:      usize,
}

/// Joins structural segments to a flow network and survey points.
pub struct Matcher<'a> {
    flow:       &'a Network,
    flow_index: FlowIndex,
    survey:     Option<SurveyIndex>,
}

impl<'a> Matcher<'a> {
    /// Index every node of `flow`.  `survey` is `None` when no survey data is
    /// available; mixes then stay zero.
    ///
    /// # Errors
    ///
    /// [`MatchError::EmptyFlowNetwork`] if `flow` has no nodes.
    pub fn new(flow: &'a Network, survey: Option<&[SurveyPoint]>) -> MatchResult<Self> {
        Self::with_index(flow, FlowIndex::build(flow), survey)
    }

    /// Use a prebuilt flow index, e.g. [`FlowIndex::build_end_nodes`].
    pub fn with_index(
        flow:       &'a Network,
        flow_index: FlowIndex,
        survey:     Option<&[SurveyPoint]>,
    ) -> MatchResult<Self> {
        if flow_index.is_empty() {
            return Err(MatchError::EmptyFlowNetwork);
        }
        let survey = match survey {
            Some(points) if !points.is_empty() => Some(SurveyIndex::build(points)),
            _ => {
                warn!("no survey points; vehicle mixes will be zero");
                None
            }
        };
        Ok(Self { flow, flow_index, survey })
    }

    /// Ranked candidate flow segments for `segment`.
    pub fn candidates(&self, segment: &Segment) -> Vec<SegmentId> {
        let votes = segment.coords().iter().flat_map(|&c| {
            self.flow_index
                .nearest(c, NEAREST_NODES)
                .into_iter()
                .filter_map(|n| self.flow.node(n))
                .flat_map(|node| node.attached().iter().copied())
        });
        rank_candidates(votes)
    }

    /// Pick the flow segment for `segment`.
    pub fn flow_match(&self, segment: &Segment) -> FlowMatch {
        let ranked: Vec<(SegmentId, &Segment)> = self
            .candidates(segment)
            .into_iter()
            .filter_map(|id| self.flow.segment(id).map(|s| (id, s)))
            .collect();

        let named = ranked.iter().find(|(_, cand)| {
            cand.attrs.street_name == segment.attrs.street_name && cand.attrs.flow.all_hours_observed()
        });
        match (named, ranked.first()) {
            (Some(&(id, _)), _) => FlowMatch::Named(id),
            (None, Some(&(id, _))) => FlowMatch::Fallback(id),
            (None, None) => FlowMatch::Unmatched,
        }
    }

    /// Mix for a segment whose flow is `flow`.
    fn vehicle_mix(&self, segment: &Segment, flow: &FlowProfile) -> VehicleMix {
        if flow.total_samples() == 0 {
            return VehicleMix::ZERO;
        }
        self.survey
            .as_ref()
            .zip(representative_point(segment.coords()))
            .and_then(|(index, p)| index.nearest_mix(p))
            .unwrap_or(VehicleMix::ZERO)
    }

    /// Copy matched flow profiles and survey mixes onto every segment of
    /// `target`.  Unmatched segments get an empty profile and a zero mix.
    pub fn match_network(&self, target: &mut Network) -> MatchReport {
        let mut report = MatchReport::default();

        for (id, segment) in target.segments_mut() {
            report.segments += 1;
            let m = self.flow_match(segment);
            match m {
                FlowMatch::Named(_)    => report.named += 1,
                FlowMatch::Fallback(_) => report.fallback += 1,
                FlowMatch::Unmatched   => report.unmatched += 1,
            }

            let flow = m
                .segment()
                .and_then(|fid| self.flow.segment(fid))
                .map_or_else(FlowProfile::empty, |s| s.attrs.flow);
            let mix = self.vehicle_mix(segment, &flow);
            if !mix.is_zero() {
                report.mixed += 1;
            }
            debug!("{id}: {m:?}");

            segment.attrs.flow = flow;
            segment.attrs.vehicle_mix = mix;
        }

        info!(
            "matched {} segments: {} named, {} fallback, {} unmatched, {} with mix",
            report.segments, report.named, report.fallback, report.unmatched, report.mixed
        );
        report
    }
}
