//! Network error type.

use thiserror::Error;

use mdt_core::{NodeId, SegmentId};

/// Errors produced by `mdt-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("segment {0} not found in network")]
    SegmentNotFound(SegmentId),

    #[error("segment needs at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    #[error("segment has {nodes} nodes but {coords} coordinates")]
    LengthMismatch { nodes: usize, coords: usize },

    #[error("segments do not share an endpoint (tail {tail}, head {head})")]
    NotAdjacent { tail: NodeId, head: NodeId },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
