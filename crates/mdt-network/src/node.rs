//! Graph vertices.

use mdt_core::{GeoPoint, NodeId, SegmentId};

/// A junction or shape point, with the segments that reference it.
///
/// `attached` keeps insertion order and holds no duplicates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:  NodeId,
    pub pos: GeoPoint,
    attached: Vec<SegmentId>,
}

impl Node {
    pub fn new(id: NodeId, pos: GeoPoint) -> Self {
        Self { id, pos, attached: Vec::new() }
    }

    /// Segments touching this node, in the order they were attached.
    #[inline]
    pub fn attached(&self) -> &[SegmentId] {
        &self.attached
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.attached.len()
    }

    /// Attach `segment`.  No-op if already attached.
    pub(crate) fn attach(&mut self, segment: SegmentId) {
        if !self.attached.contains(&segment) {
            self.attached.push(segment);
        }
    }

    /// Rewrite every occurrence of `old` to `new`, in place, dropping any
    /// duplicate this creates.
    pub(crate) fn rewrite(&mut self, old: SegmentId, new: SegmentId) {
        let mut seen_new = false;
        self.attached.retain_mut(|id| {
            if *id == old {
                *id = new;
            }
            if *id == new {
                if seen_new {
                    return false;
                }
                seen_new = true;
            }
            true
        });
    }
}
