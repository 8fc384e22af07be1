//! The `Network` arena.
//!
//! # Data layout
//!
//! Nodes and segments live in insertion-ordered `Vec`s with an `FxHashMap` from
//! external id to slot.  Nodes are never removed.  Segments are removed only by
//! [`Network::replace_segments`], which leaves a tombstone (`None`) in the old
//! slots and appends the replacement, so iteration order stays deterministic:
//! surviving segments in the order they were added, replacements last.
//!
//! [`Network::compact`] drops tombstones without changing that order.

use log::debug;
use rustc_hash::FxHashMap;

use mdt_core::{GeoPoint, NodeId, SegmentId};

use crate::{Node, NetworkError, NetworkResult, Segment};

/// Owned road graph: nodes, segments, and the back-references between them.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Network {
    nodes:         Vec<Node>,
    node_index:    FxHashMap<NodeId, usize>,
    segments:      Vec<Option<(SegmentId, Segment)>>,
    segment_index: FxHashMap<SegmentId, usize>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for bulk ingestion.
    pub fn with_capacity(nodes: usize, segments: usize) -> Self {
        Self {
            nodes:         Vec::with_capacity(nodes),
            node_index:    FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            segments:      Vec::with_capacity(segments),
            segment_index: FxHashMap::with_capacity_and_hasher(segments, Default::default()),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Live segments (tombstones excluded).
    pub fn segment_count(&self) -> usize {
        self.segment_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_index.is_empty()
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    /// Insert a node at `pos`.  Returns `false` (and keeps the existing
    /// position) if `id` is already present.
    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint) -> bool {
        if self.node_index.contains_key(&id) {
            return false;
        }
        self.node_index.insert(id, self.nodes.len());
        self.nodes.push(Node::new(id, pos));
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    fn node_mut(&mut self, id: NodeId) -> NetworkResult<&mut Node> {
        let i = *self.node_index.get(&id).ok_or(NetworkError::NodeNotFound(id))?;
        Ok(&mut self.nodes[i])
    }

    /// True if `id` is the first or last node of any attached segment.
    pub fn is_end_node(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        node.attached()
            .iter()
            .filter_map(|s| self.segment(*s))
            .any(|seg| seg.head() == id || seg.tail() == id)
    }

    // ── Segments ──────────────────────────────────────────────────────────

    pub fn contains_segment(&self, id: SegmentId) -> bool {
        self.segment_index.contains_key(&id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        let i = *self.segment_index.get(&id)?;
        self.segments[i].as_ref().map(|(_, s)| s)
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        let i = *self.segment_index.get(&id)?;
        self.segments[i].as_mut().map(|(_, s)| s)
    }

    /// Live segments in deterministic arena order.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> + '_ {
        self.segments.iter().flatten().map(|(id, s)| (*id, s))
    }

    pub fn segments_mut(&mut self) -> impl Iterator<Item = (SegmentId, &mut Segment)> + '_ {
        self.segments.iter_mut().flatten().map(|(id, s)| (*id, s))
    }

    /// Snapshot of live segment ids in arena order.
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments().map(|(id, _)| id).collect()
    }

    /// Insert `segment` under `id` and attach it to every node it references.
    ///
    /// Returns `Ok(false)` without modifying anything if `id` is already
    /// present: the first definition of a segment wins.
    ///
    /// # Errors
    ///
    /// [`NetworkError::NodeNotFound`] if the segment references a node that
    /// has not been added.
    pub fn add_segment(&mut self, id: SegmentId, segment: Segment) -> NetworkResult<bool> {
        if self.contains_segment(id) {
            return Ok(false);
        }
        if let Some(missing) = segment.nodes().iter().find(|n| !self.contains_node(**n)) {
            return Err(NetworkError::NodeNotFound(*missing));
        }
        for &n in segment.nodes() {
            self.node_mut(n)?.attach(id);
        }
        self.segment_index.insert(id, self.segments.len());
        self.segments.push(Some((id, segment)));
        Ok(true)
    }

    /// Atomically swap segments `a` and `b` for `replacement`.
    ///
    /// Removes both old ids, inserts the replacement under `new_id`, and
    /// rewrites the attached list of every node either old segment touched.
    /// If `new_id` is already taken by an unrelated segment the next free id
    /// above it is used.  Returns the id actually assigned.
    ///
    /// # Errors
    ///
    /// [`NetworkError::SegmentNotFound`] if `a` or `b` is missing, or
    /// [`NetworkError::NodeNotFound`] if the replacement references a node not
    /// in the network.  Nothing is modified on error.
    pub fn replace_segments(
        &mut self,
        a:           SegmentId,
        b:           SegmentId,
        new_id:      SegmentId,
        replacement: Segment,
    ) -> NetworkResult<SegmentId> {
        let slot_a = *self.segment_index.get(&a).ok_or(NetworkError::SegmentNotFound(a))?;
        let slot_b = *self.segment_index.get(&b).ok_or(NetworkError::SegmentNotFound(b))?;
        if let Some(missing) = replacement.nodes().iter().find(|n| !self.contains_node(**n)) {
            return Err(NetworkError::NodeNotFound(*missing));
        }

        let mut id = new_id;
        while id != a && id != b && self.contains_segment(id) {
            id = SegmentId(id.0.wrapping_add(1));
        }
        if id != new_id {
            debug!("replacement id {new_id} taken, using {id}");
        }

        let mut touched: Vec<NodeId> = Vec::new();
        for slot in [slot_a, slot_b] {
            if let Some((_, old)) = self.segments[slot].take() {
                touched.extend_from_slice(old.nodes());
            }
        }
        self.segment_index.remove(&a);
        self.segment_index.remove(&b);

        touched.sort_unstable();
        touched.dedup();
        for n in touched {
            let node = self.node_mut(n)?;
            node.rewrite(a, id);
            node.rewrite(b, id);
        }

        self.segment_index.insert(id, self.segments.len());
        self.segments.push(Some((id, replacement)));
        Ok(id)
    }

    /// Flip a segment between open and closed.  Returns the new state.
    pub fn toggle_closed(&mut self, id: SegmentId) -> NetworkResult<bool> {
        let seg = self.segment_mut(id).ok_or(NetworkError::SegmentNotFound(id))?;
        seg.closed = !seg.closed;
        Ok(seg.closed)
    }

    pub fn is_closed(&self, id: SegmentId) -> NetworkResult<bool> {
        self.segment(id)
            .map(|s| s.closed)
            .ok_or(NetworkError::SegmentNotFound(id))
    }

    /// Fold `other` into this network.
    ///
    /// Nodes and segments whose ids already exist here are kept as they are;
    /// new segments are attached to their nodes, including nodes that both
    /// networks share.  Returns the number of segments added.
    pub fn merge(&mut self, other: Network) -> NetworkResult<usize> {
        for node in &other.nodes {
            self.add_node(node.id, node.pos);
        }
        let mut added = 0;
        for (id, seg) in other.segments.into_iter().flatten() {
            if self.add_segment(id, seg)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Drop tombstoned segment slots, preserving iteration order.
    pub fn compact(&mut self) {
        if self.segments.len() == self.segment_index.len() {
            return;
        }
        self.segments.retain(Option::is_some);
        self.segment_index.clear();
        for (i, entry) in self.segments.iter().enumerate() {
            if let Some((id, _)) = entry {
                self.segment_index.insert(*id, i);
            }
        }
    }
}
