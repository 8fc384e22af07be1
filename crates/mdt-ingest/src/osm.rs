//! OSM PBF topology source — enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use mdt_ingest::{RetryPolicy, build_topology_network, osm::OsmPbfSource};
//!
//! let mut source = OsmPbfSource::new(Path::new("manchester.osm.pbf"));
//! let network = build_topology_network(&mut source, &RetryPolicy::default())?;
//! ```
//!
//! # What is loaded
//!
//! Ways with a drivable `highway=*` tag (see [`is_drivable`]) and the nodes
//! they reference.  Everything else is ignored.  The whole extract is one
//! batch.
//!
//! # Memory note
//!
//! Every OSM node is buffered in a map during the single read pass because
//! ways reference nodes by id and may precede them in the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use osmpbf::{Element, ElementReader};
use rustc_hash::FxHashMap;

use mdt_core::GeoPoint;

use crate::{IngestError, IngestResult, QueryFault, RawNode, RawWay, TopologySource};

/// Reads a PBF extract as a single topology batch.
pub struct OsmPbfSource {
    path: PathBuf,
    done: bool,
}

impl OsmPbfSource {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_owned(), done: false }
    }
}

impl TopologySource for OsmPbfSource {
    fn next_batch(&mut self) -> Result<Option<Vec<RawWay>>, QueryFault> {
        if self.done {
            return Ok(None);
        }
        let ways = read_pbf_ways(&self.path).map_err(|e| QueryFault::Other(e.to_string()))?;
        self.done = true;
        Ok(Some(ways))
    }
}

/// Read every drivable way in `path`, with node coordinates resolved.
///
/// A way referencing a node outside the extract is skipped with a warning
/// (see [`resolve_way`]).
pub fn read_pbf_ways(path: &Path) -> IngestResult<Vec<RawWay>> {
    let reader = ElementReader::from_path(path).map_err(|e| IngestError::Osm(e.to_string()))?;

    let mut positions: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut pending: Vec<(i64, Vec<i64>, HashMap<String, String>)> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                positions.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                positions.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the closure.
                let tags: HashMap<String, String> =
                    w.tags().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
                if tags.get("highway").is_some_and(|h| is_drivable(h)) {
                    pending.push((w.id(), w.refs().collect(), tags));
                }
            }
            _ => {}
        })
        .map_err(|e| IngestError::Osm(e.to_string()))?;

    let total = pending.len();
    let ways: Vec<RawWay> = pending
        .into_iter()
        .filter_map(|(id, refs, tags)| resolve_way(id, &refs, tags, &positions))
        .collect();
    info!("{}: {} drivable ways, {} skipped", path.display(), ways.len(), total - ways.len());
    Ok(ways)
}

/// Attach coordinates to every node reference of a way.
///
/// Returns `None`, logging the first unresolved reference, when any node is
/// absent from `positions`; a partial way would join nodes that are not
/// adjacent on the road.
pub fn resolve_way(
    id:        i64,
    refs:      &[i64],
    tags:      HashMap<String, String>,
    positions: &FxHashMap<i64, GeoPoint>,
) -> Option<RawWay> {
    let mut nodes = Vec::with_capacity(refs.len());
    for &r in refs {
        let Some(&pos) = positions.get(&r) else {
            warn!("way {id} references node {r} outside the extract, skipped");
            return None;
        };
        nodes.push(RawNode { id: r.unsigned_abs(), pos });
    }
    Some(RawWay { id: id.unsigned_abs(), nodes, tags })
}

/// False for `highway` values cars cannot use.
pub fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track" | "bridleway"
            | "corridor" | "proposed" | "construction"
    )
}
