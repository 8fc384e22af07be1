//! Map-query topology ingestion.
//!
//! A [`TopologySource`] hands out batches of [`RawWay`]s: road units with an
//! ordered list of node references (stable id + coordinates) and a tag set.
//! [`build_topology_network`] drains a source into a [`Network`], retrying the
//! two transient fault classes forever with a fixed per-class delay.
//!
//! Batches already received are kept across retries; a retry only repeats the
//! call that failed.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use mdt_core::{GeoPoint, NodeId, SegmentId};
use mdt_network::{Network, Segment};

use crate::{IngestError, IngestResult, attributes_from_tags};

// ── Raw records ───────────────────────────────────────────────────────────────

/// A node reference as the topology source reports it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawNode {
    pub id:  u64,
    pub pos: GeoPoint,
}

/// One road unit from the topology source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawWay {
    pub id:    u64,
    pub nodes: Vec<RawNode>,
    pub tags:  HashMap<String, String>,
}

// ── Faults and retry ──────────────────────────────────────────────────────────

/// Why a topology query failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryFault {
    /// The server is rate limiting this client.
    TooManyRequests,
    /// The server is overloaded.
    GatewayTimeout,
    /// Anything else.  Not retried.
    Other(String),
}

impl fmt::Display for QueryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyRequests => f.write_str("too many requests"),
            Self::GatewayTimeout  => f.write_str("gateway timeout"),
            Self::Other(msg)      => f.write_str(msg),
        }
    }
}

impl std::error::Error for QueryFault {}

/// Fixed delays applied before retrying a transient fault.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub too_many_requests: Duration,
    pub gateway_timeout:   Duration,
}

impl RetryPolicy {
    /// No waiting.  For tests and replayed sources.
    pub const IMMEDIATE: RetryPolicy = RetryPolicy {
        too_many_requests: Duration::ZERO,
        gateway_timeout:   Duration::ZERO,
    };

    /// Delay before retrying `fault`, or `None` if it must not be retried.
    pub fn delay_for(&self, fault: &QueryFault) -> Option<Duration> {
        match fault {
            QueryFault::TooManyRequests => Some(self.too_many_requests),
            QueryFault::GatewayTimeout  => Some(self.gateway_timeout),
            QueryFault::Other(_)        => None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            too_many_requests: Duration::from_secs(10),
            gateway_timeout:   Duration::from_secs(20),
        }
    }
}

// ── TopologySource ────────────────────────────────────────────────────────────

/// Supplier of raw topology, one batch per call.
///
/// `Ok(None)` means the source is exhausted.  After an `Err` the next call
/// must retry the same batch.
pub trait TopologySource {
    fn next_batch(&mut self) -> Result<Option<Vec<RawWay>>, QueryFault>;
}

/// In-memory source yielding pre-fetched batches in order.
#[derive(Clone, Debug, Default)]
pub struct BatchSource {
    batches: VecDeque<Vec<RawWay>>,
}

impl BatchSource {
    pub fn new(batches: impl IntoIterator<Item = Vec<RawWay>>) -> Self {
        Self { batches: batches.into_iter().collect() }
    }
}

impl TopologySource for BatchSource {
    fn next_batch(&mut self) -> Result<Option<Vec<RawWay>>, QueryFault> {
        Ok(self.batches.pop_front())
    }
}

/// Call `source.next_batch()` until it stops failing transiently.
pub fn fetch_with_retry<S: TopologySource + ?Sized>(
    source: &mut S,
    retry:  &RetryPolicy,
) -> IngestResult<Option<Vec<RawWay>>> {
    loop {
        match source.next_batch() {
            Ok(batch) => return Ok(batch),
            Err(fault) => match retry.delay_for(&fault) {
                Some(delay) => {
                    warn!("topology query: {fault}, retrying in {}s", delay.as_secs_f64());
                    thread::sleep(delay);
                }
                None => return Err(IngestError::Query(fault)),
            },
        }
    }
}

// ── Network construction ──────────────────────────────────────────────────────

/// Drain `source` and build a network from every way it yields.
///
/// # Errors
///
/// A non-transient [`QueryFault`], or a way that cannot form a segment.
pub fn build_topology_network<S: TopologySource + ?Sized>(
    source: &mut S,
    retry:  &RetryPolicy,
) -> IngestResult<Network> {
    let mut ways: Vec<RawWay> = Vec::new();
    while let Some(batch) = fetch_with_retry(source, retry)? {
        debug!("topology batch: {} ways", batch.len());
        ways.extend(batch);
    }
    network_from_ways(ways)
}

/// Build a network from already-fetched ways.
///
/// Node positions come from the first way that mentions the node.  A way id
/// seen twice keeps its first definition.  Ways with fewer than two nodes
/// cannot form a segment and are skipped with a warning.
pub fn network_from_ways(ways: Vec<RawWay>) -> IngestResult<Network> {
    let node_hint: usize = ways.iter().map(|w| w.nodes.len()).sum();
    let mut net = Network::with_capacity(node_hint, ways.len());
    let mut skipped = 0usize;

    for way in ways {
        if way.nodes.len() < 2 {
            warn!("way {} has {} node(s), skipped", way.id, way.nodes.len());
            skipped += 1;
            continue;
        }
        let id = SegmentId(way.id);
        if net.contains_segment(id) {
            continue;
        }

        let mut node_ids = Vec::with_capacity(way.nodes.len());
        let mut coords = Vec::with_capacity(way.nodes.len());
        for raw in &way.nodes {
            let nid = NodeId(raw.id);
            net.add_node(nid, raw.pos);
            // Shared nodes keep the position they were first seen at.
            let pos = net.node(nid).map_or(raw.pos, |n| n.pos);
            node_ids.push(nid);
            coords.push(pos);
        }

        let segment = Segment::new(node_ids, coords, attributes_from_tags(&way.tags))?;
        net.add_segment(id, segment)?;
    }

    info!(
        "topology network: {} nodes, {} segments ({skipped} ways skipped)",
        net.node_count(),
        net.segment_count()
    );
    Ok(net)
}
