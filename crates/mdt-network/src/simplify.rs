//! Degree-2 node elimination.
//!
//! Source topologies split a street at every junction and shape change.  The
//! simplifier joins two segments meeting at a node of degree 2 when they carry
//! the same street name and run head-to-tail through that node, so segment
//! granularity approaches one segment per road stretch.
//!
//! # Pass semantics
//!
//! [`simplify`] visits every node once, in insertion order, reading the live
//! network: a segment created earlier in the pass can be joined again at a
//! later node.  Chains whose merge node was visited before its neighbour was
//! rewritten survive the pass; [`simplify_until_stable`] repeats until nothing
//! merges.

use log::{debug, info};

use mdt_core::{GeoPoint, HOURS, HourlyFlow, NodeId, SegmentId, round2};

use crate::{Network, NetworkError, NetworkResult, SegmentAttributes};

// ── Merge policy ──────────────────────────────────────────────────────────────

/// Decides the attribute record of a joined segment.
///
/// `first` and `second` are the attributes of the two segments in the order
/// the node's attached list holds them, not their order along the road.
pub trait MergePolicy {
    fn merge(&self, first: &SegmentAttributes, second: &SegmentAttributes) -> SegmentAttributes;
}

impl<F> MergePolicy for F
where
    F: Fn(&SegmentAttributes, &SegmentAttributes) -> SegmentAttributes,
{
    fn merge(&self, first: &SegmentAttributes, second: &SegmentAttributes) -> SegmentAttributes {
        self(first, second)
    }
}

/// Merge policy for flow-dataset networks.
///
/// Keeps the descriptive attributes and vehicle mix of `first`, combines the
/// hourly flow slot by slot with [`merge_hourly`], and clears emissions.
#[derive(Copy, Clone, Debug, Default)]
pub struct FlowMergePolicy;

impl MergePolicy for FlowMergePolicy {
    fn merge(&self, first: &SegmentAttributes, second: &SegmentAttributes) -> SegmentAttributes {
        let mut out = first.clone();
        for (slot, (a, b)) in out
            .flow
            .slots_mut()
            .iter_mut()
            .zip(first.flow.slots().iter().zip(second.flow.slots()))
        {
            *slot = merge_hourly(a, b);
        }
        out.emissions = [0.0; HOURS];
        out
    }
}

/// Combine two observations of the same hour.
///
/// Both observed: sample-weighted mean speed, mean of the medians, larger
/// sample count.  One observed: that one.  Neither: `a`.
pub fn merge_hourly(a: &HourlyFlow, b: &HourlyFlow) -> HourlyFlow {
    match (a.is_observed(), b.is_observed()) {
        (true, true) => {
            let (na, nb) = (a.sample_count as f64, b.sample_count as f64);
            HourlyFlow {
                hour:         a.hour,
                mean_speed:   round2((a.mean_speed * na + b.mean_speed * nb) / (na + nb)),
                median_speed: round2((a.median_speed + b.median_speed) / 2.0),
                sample_count: a.sample_count.max(b.sample_count),
            }
        }
        (false, true) => *b,
        _ => *a,
    }
}

// ── Replacement ids ───────────────────────────────────────────────────────────

/// Coordinate-derived id for a joined segment, from its first two vertices.
pub fn derived_segment_id(coords: &[GeoPoint]) -> SegmentId {
    let key = |p: &GeoPoint| (p.lat + p.lon).abs();
    let c0 = coords.first().map(key).unwrap_or(0.0);
    let c1 = coords.get(1).map(key).unwrap_or(0.0);
    SegmentId((c0 + c1 * 1e5) as u64)
}

// ── Passes ────────────────────────────────────────────────────────────────────

/// One simplification pass.  Returns the number of joins performed.
///
/// # Errors
///
/// Only on a broken network invariant (an attached id with no segment, or a
/// node missing from the arena); a well-formed network never errors.
pub fn simplify<P: MergePolicy>(network: &mut Network, policy: &P) -> NetworkResult<usize> {
    let before = network.segment_count();
    let node_ids: Vec<NodeId> = network.nodes().map(|n| n.id).collect();
    let mut joins = 0;

    for node_id in node_ids {
        if try_join_at(network, node_id, policy)?.is_some() {
            joins += 1;
        }
    }

    network.compact();
    info!(
        "simplify: {joins} joins, {before} -> {} segments",
        network.segment_count()
    );
    Ok(joins)
}

/// Repeat [`simplify`] until a pass performs no join.  Returns the total.
///
/// Terminates because every join removes one segment.
pub fn simplify_until_stable<P: MergePolicy>(
    network: &mut Network,
    policy: &P,
) -> NetworkResult<usize> {
    let mut total = 0;
    loop {
        let joins = simplify(network, policy)?;
        if joins == 0 {
            return Ok(total);
        }
        total += joins;
    }
}

/// Join the two segments at `node_id` if the node qualifies.
fn try_join_at<P: MergePolicy>(
    network: &mut Network,
    node_id: NodeId,
    policy:  &P,
) -> NetworkResult<Option<SegmentId>> {
    let Some(node) = network.node(node_id) else {
        return Ok(None);
    };
    let &[id0, id1] = node.attached() else {
        return Ok(None);
    };
    let seg0 = network.segment(id0).ok_or(NetworkError::SegmentNotFound(id0))?;
    let seg1 = network.segment(id1).ok_or(NetworkError::SegmentNotFound(id1))?;
    if seg0.attrs.street_name != seg1.attrs.street_name {
        return Ok(None);
    }

    let forward = node_id == seg0.tail() && node_id == seg1.head();
    if !forward && !(node_id == seg0.head() && node_id == seg1.tail()) {
        return Ok(None);
    }

    let attrs = policy.merge(&seg0.attrs, &seg1.attrs);
    let joined = if forward { seg0.join(seg1, attrs)? } else { seg1.join(seg0, attrs)? };

    let new_id = derived_segment_id(joined.coords());
    let id = network.replace_segments(id0, id1, new_id, joined)?;
    debug!("joined {id0} + {id1} at {node_id} -> {id}");
    Ok(Some(id))
}
