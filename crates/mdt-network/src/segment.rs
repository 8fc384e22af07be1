//! Road segments and their attribute record.

use mdt_core::{FlowProfile, GeoPoint, HOURS, HourlySeries, NodeId, RoadClass, SpeedLimit, VehicleMix};

use crate::{NetworkError, NetworkResult};

/// Street name used when the source has none.
pub const UNNAMED: &str = "unnamed";

// ── SegmentAttributes ─────────────────────────────────────────────────────────

/// Descriptive and measured data carried by a segment.
///
/// Optional source tags are resolved at ingestion (see `mdt-ingest`), so every
/// field here is always present; `None`/`Unknown` mean the source did not say.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentAttributes {
    pub street_name: String,
    pub road_class:  RoadClass,
    pub lanes:       u8,
    pub speed_limit: SpeedLimit,
    /// Raw `oneway` tag text.
    pub oneway:      Option<String>,
    /// Raw `width` tag text.
    pub width:       Option<String>,
    pub flow:        FlowProfile,
    /// Pollutant mass per hourly slot, grams.
    pub emissions:   HourlySeries,
    pub vehicle_mix: VehicleMix,
}

impl SegmentAttributes {
    /// Defaults with the given street name.
    pub fn named(street_name: impl Into<String>) -> Self {
        Self { street_name: street_name.into(), ..Self::default() }
    }
}

impl Default for SegmentAttributes {
    fn default() -> Self {
        let road_class = RoadClass::default();
        Self {
            street_name: UNNAMED.to_owned(),
            lanes:       road_class.default_lanes(),
            road_class,
            speed_limit: SpeedLimit::Unknown,
            oneway:      None,
            width:       None,
            flow:        FlowProfile::empty(),
            emissions:   [0.0; HOURS],
            vehicle_mix: VehicleMix::ZERO,
        }
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// A polyline between graph nodes.
///
/// Length and centroid are computed from the coordinates on construction and
/// never go stale because the geometry is immutable; joining produces a new
/// segment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    nodes:     Vec<NodeId>,
    coords:    Vec<GeoPoint>,
    length_km: f64,
    centroid:  GeoPoint,
    /// Closed segments are skipped by the emissions pass.
    pub closed: bool,
    pub attrs:  SegmentAttributes,
}

impl Segment {
    /// # Errors
    ///
    /// [`NetworkError::TooFewNodes`] for fewer than two nodes,
    /// [`NetworkError::LengthMismatch`] when `nodes` and `coords` differ in
    /// length.
    pub fn new(
        nodes:  Vec<NodeId>,
        coords: Vec<GeoPoint>,
        attrs:  SegmentAttributes,
    ) -> NetworkResult<Self> {
        if nodes.len() != coords.len() {
            return Err(NetworkError::LengthMismatch { nodes: nodes.len(), coords: coords.len() });
        }
        if nodes.len() < 2 {
            return Err(NetworkError::TooFewNodes(nodes.len()));
        }
        let length_km = coords.windows(2).map(|w| w[0].distance_km(w[1])).sum();
        // Vertex mean, not length-weighted: dense vertex runs pull the point.
        let centroid = GeoPoint::mean(&coords).unwrap_or_default();
        Ok(Self { nodes, coords, length_km, centroid, closed: false, attrs })
    }

    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    #[inline]
    pub fn coords(&self) -> &[GeoPoint] {
        &self.coords
    }

    /// First node.
    #[inline]
    pub fn head(&self) -> NodeId {
        self.nodes[0]
    }

    /// Last node.
    #[inline]
    pub fn tail(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Sum of geodesic distances between consecutive coordinates, km.
    #[inline]
    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    #[inline]
    pub fn centroid(&self) -> GeoPoint {
        self.centroid
    }

    /// Append `next` to this segment, producing a new segment.
    ///
    /// `next` must start where `self` ends; the shared endpoint appears once
    /// in the result.  Neither input is modified.
    pub fn join(&self, next: &Segment, attrs: SegmentAttributes) -> NetworkResult<Segment> {
        if self.tail() != next.head() {
            return Err(NetworkError::NotAdjacent { tail: self.tail(), head: next.head() });
        }
        let nodes = self.nodes.iter().chain(&next.nodes[1..]).copied().collect();
        let coords = self.coords.iter().chain(&next.coords[1..]).copied().collect();
        Segment::new(nodes, coords, attrs)
    }
}
