//! R-tree point indexes over flow-network nodes and survey points.
//!
//! Distances are squared Euclidean in `[lat, lon]` degrees, not geodesic.
//! At city scale the ranking of near neighbours is the same either way.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use mdt_core::{GeoPoint, NodeId, VehicleMix};
use mdt_ingest::SurveyPoint;
use mdt_network::Network;

// ── R-tree entries ────────────────────────────────────────────────────────────

/// A `[lat, lon]` point carrying a payload.
#[derive(Clone)]
struct PointEntry<T> {
    point: [f64; 2],
    data:  T,
}

impl<T> RTreeObject for PointEntry<T> {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl<T> PointDistance for PointEntry<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── FlowIndex ─────────────────────────────────────────────────────────────────

/// Nearest-node lookup over a flow network.
pub struct FlowIndex {
    tree: RTree<PointEntry<NodeId>>,
}

impl FlowIndex {
    /// Index every node of `network`.
    pub fn build(network: &Network) -> Self {
        Self::from_nodes(network, |_| true)
    }

    /// Index only nodes that start or end some segment.
    pub fn build_end_nodes(network: &Network) -> Self {
        Self::from_nodes(network, |id| network.is_end_node(id))
    }

    fn from_nodes(network: &Network, keep: impl Fn(NodeId) -> bool) -> Self {
        let entries = network
            .nodes()
            .filter(|n| keep(n.id))
            .map(|n| PointEntry { point: n.pos.to_array(), data: n.id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Up to `k` nodes nearest to `pos`, closest first.
    pub fn nearest(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.tree
            .nearest_neighbor_iter(&pos.to_array())
            .take(k)
            .map(|e| e.data)
            .collect()
    }
}

// ── SurveyIndex ───────────────────────────────────────────────────────────────

/// Nearest-survey-point lookup.
pub struct SurveyIndex {
    tree: RTree<PointEntry<VehicleMix>>,
}

impl SurveyIndex {
    pub fn build(points: &[SurveyPoint]) -> Self {
        let entries = points
            .iter()
            .map(|p| PointEntry { point: p.pos.to_array(), data: p.mix })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Mix of the survey point nearest to `pos`.  `None` only when empty.
    pub fn nearest_mix(&self, pos: GeoPoint) -> Option<VehicleMix> {
        self.tree.nearest_neighbor(&pos.to_array()).map(|e| e.data)
    }
}
