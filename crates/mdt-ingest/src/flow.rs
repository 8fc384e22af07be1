//! Flow-dataset (traffic statistics) JSON loader.
//!
//! # JSON format
//!
//! ```json
//! { "network": { "segmentResults": [
//!   { "segmentId": -1234, "streetName": "Oxford Road",
//!     "shape": [ {"latitude": 53.46, "longitude": -2.23}, ... ],
//!     "segmentTimeResults": [
//!       {"timeSet": 2, "averageSpeed": 31.2, "medianSpeed": 29.0, "sampleSize": 14}, ...
//!     ] } ] } }
//! ```
//!
//! Segment ids are taken as absolute values.  The dataset has no node
//! identity, so each shape point gets a key derived from its coordinates by
//! [`flow_node_id`]; segments that share a physical point share a node.
//!
//! Time set `t` is the hour starting at `t + 4` o'clock.  Time sets outside
//! 06..17 are ignored.  Speeds are rounded to two decimals.
//!
//! A record whose shape has fewer than two points cannot form a segment; it
//! is skipped with a warning, the same way the topology builder treats a
//! one-node way.

use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};
use serde::Deserialize;

use mdt_core::{FIRST_HOUR, FlowProfile, GeoPoint, HOURS, HourlyFlow, NodeId, SegmentId, round2};
use mdt_network::segment::UNNAMED;
use mdt_network::{Network, Segment, SegmentAttributes};

use crate::IngestResult;

/// Offset from a time-set number to its wall-clock starting hour.
pub const TIME_SET_HOUR_OFFSET: i64 = 4;

// ── JSON records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Document {
    network: Results,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Results {
    segment_results: Vec<FlowSegmentRecord>,
}

/// One segment of the flow dataset.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSegmentRecord {
    pub segment_id:           i64,
    #[serde(default)]
    pub street_name:          Option<String>,
    pub shape:                Vec<ShapePoint>,
    #[serde(default)]
    pub segment_time_results: Vec<TimeResult>,
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct ShapePoint {
    pub latitude:  f64,
    pub longitude: f64,
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeResult {
    pub time_set:      i64,
    pub average_speed: f64,
    pub median_speed:  f64,
    pub sample_size:   f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Node key for a flow-dataset shape point: `|lat × lon| × 10¹²`, truncated.
///
/// Deterministic, so identical coordinates always map to the same node.
pub fn flow_node_id(pos: GeoPoint) -> NodeId {
    NodeId(((pos.lat * pos.lon).abs() * 1e12) as u64)
}

/// Load a flow dataset file into a network.  No simplification is applied.
pub fn load_flow_json(path: &Path) -> IngestResult<Network> {
    let file = std::fs::File::open(path)?;
    load_flow_reader(std::io::BufReader::new(file))
}

/// Like [`load_flow_json`] but accepts any `Read` source.
pub fn load_flow_reader<R: Read>(reader: R) -> IngestResult<Network> {
    let doc: Document = serde_json::from_reader(reader)?;
    build_flow_network(doc.network.segment_results)
}

/// Build a network from parsed flow records.
///
/// A repeated segment id keeps its first record.  Records with fewer than
/// two shape points are skipped.
pub fn build_flow_network(records: Vec<FlowSegmentRecord>) -> IngestResult<Network> {
    let mut net = Network::with_capacity(records.len() * 4, records.len());
    let mut skipped = 0usize;

    for record in records {
        let id = SegmentId(record.segment_id.unsigned_abs());
        if record.shape.len() < 2 {
            warn!("flow segment {id} has {} shape point(s), skipped", record.shape.len());
            skipped += 1;
            continue;
        }
        if net.contains_segment(id) {
            debug!("duplicate flow segment {id} ignored");
            continue;
        }

        let mut node_ids = Vec::with_capacity(record.shape.len());
        let mut coords = Vec::with_capacity(record.shape.len());
        for p in &record.shape {
            let pos = GeoPoint::new(p.latitude, p.longitude);
            let nid = flow_node_id(pos);
            net.add_node(nid, pos);
            node_ids.push(nid);
            coords.push(net.node(nid).map_or(pos, |n| n.pos));
        }

        let attrs = SegmentAttributes {
            street_name: record.street_name.clone().unwrap_or_else(|| UNNAMED.to_owned()),
            flow: flow_profile(&record.segment_time_results),
            ..SegmentAttributes::default()
        };
        net.add_segment(id, Segment::new(node_ids, coords, attrs)?)?;
    }

    info!(
        "flow network: {} nodes, {} segments ({skipped} skipped)",
        net.node_count(),
        net.segment_count()
    );
    Ok(net)
}

/// Place time results into the twelve hourly slots.
pub fn flow_profile(results: &[TimeResult]) -> FlowProfile {
    let mut profile = FlowProfile::empty();
    for r in results {
        let hour = r.time_set + TIME_SET_HOUR_OFFSET;
        let slot = hour - FIRST_HOUR as i64;
        if !(0..HOURS as i64).contains(&slot) {
            continue;
        }
        profile.slots_mut()[slot as usize] = HourlyFlow {
            hour:         hour as u8,
            mean_speed:   round2(r.average_speed),
            median_speed: round2(r.median_speed),
            sample_count: r.sample_size.max(0.0).round() as u32,
        };
    }
    profile
}
