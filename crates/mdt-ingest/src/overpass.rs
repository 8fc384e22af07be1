//! Overpass API JSON results.
//!
//! The expected query shape is
//!
//! ```text
//! [out:json]; way["highway"](bbox); out body; >; out skel qt;
//! ```
//!
//! which returns the ways with their tags followed by every referenced node.
//! Relations and other element types are ignored.
//!
//! With the `overpass` feature, [`OverpassSource`] runs queries against a live
//! endpoint and reports rate limiting (HTTP 429) and overload (HTTP 504) as
//! the two transient [`QueryFault`]s.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use mdt_core::GeoPoint;

use crate::{IngestError, IngestResult, RawNode, RawWay};

#[derive(Deserialize)]
struct Response {
    elements: Vec<Element>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id:  u64,
        lat: f64,
        lon: f64,
    },
    Way {
        id:    u64,
        #[serde(default)]
        nodes: Vec<u64>,
        #[serde(default)]
        tags:  HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Read an Overpass JSON result file.
pub fn load_overpass_json(path: &Path) -> IngestResult<Vec<RawWay>> {
    let file = std::fs::File::open(path)?;
    parse_overpass_reader(std::io::BufReader::new(file))
}

/// Like [`load_overpass_json`] but accepts any `Read` source.
pub fn parse_overpass_reader<R: Read>(reader: R) -> IngestResult<Vec<RawWay>> {
    let response: Response = serde_json::from_reader(reader)?;
    resolve(response)
}

pub fn parse_overpass_str(json: &str) -> IngestResult<Vec<RawWay>> {
    resolve(serde_json::from_str(json)?)
}

/// Attach node coordinates to each way, preserving way order.
fn resolve(response: Response) -> IngestResult<Vec<RawWay>> {
    let mut positions: FxHashMap<u64, GeoPoint> = FxHashMap::default();
    let mut pending: Vec<(u64, Vec<u64>, HashMap<String, String>)> = Vec::new();

    for element in response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                positions.insert(id, GeoPoint::new(lat, lon));
            }
            Element::Way { id, nodes, tags } => pending.push((id, nodes, tags)),
            Element::Other => {}
        }
    }

    pending
        .into_iter()
        .map(|(id, refs, tags)| {
            let nodes = refs
                .into_iter()
                .map(|node| {
                    positions
                        .get(&node)
                        .map(|&pos| RawNode { id: node, pos })
                        .ok_or(IngestError::MissingNode { way: id, node })
                })
                .collect::<IngestResult<Vec<_>>>()?;
            Ok(RawWay { id, nodes, tags })
        })
        .collect()
}

// ── Live endpoint ─────────────────────────────────────────────────────────────

#[cfg(feature = "overpass")]
pub use live::OverpassSource;

#[cfg(feature = "overpass")]
mod live {
    use std::collections::VecDeque;

    use log::info;

    use crate::{QueryFault, RawWay, TopologySource};

    /// Public Overpass instance.
    pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

    /// Runs one Overpass query per batch.
    ///
    /// A query is dropped from the queue only once it has succeeded, so a
    /// transient fault followed by a retry repeats the same query.
    pub struct OverpassSource {
        endpoint: String,
        queries:  VecDeque<String>,
        client:   reqwest::blocking::Client,
    }

    impl OverpassSource {
        pub fn new(queries: impl IntoIterator<Item = String>) -> Self {
            Self::with_endpoint(DEFAULT_ENDPOINT, queries)
        }

        pub fn with_endpoint(
            endpoint: impl Into<String>,
            queries:  impl IntoIterator<Item = String>,
        ) -> Self {
            Self {
                endpoint: endpoint.into(),
                // Query files are often written across several lines.
                queries:  queries.into_iter().map(|q| q.replace('\n', " ")).collect(),
                client:   reqwest::blocking::Client::new(),
            }
        }
    }

    impl TopologySource for OverpassSource {
        fn next_batch(&mut self) -> Result<Option<Vec<RawWay>>, QueryFault> {
            let Some(query) = self.queries.front() else {
                return Ok(None);
            };
            info!("querying {} ({} queries left)", self.endpoint, self.queries.len());

            let resp = self
                .client
                .post(&self.endpoint)
                .body(query.clone())
                .send()
                .map_err(|e| QueryFault::Other(e.to_string()))?;

            if resp.status() == 429 {
                return Err(QueryFault::TooManyRequests);
            }
            if resp.status() == 504 {
                return Err(QueryFault::GatewayTimeout);
            }
            if !resp.status().is_success() {
                return Err(QueryFault::Other(format!("HTTP {}", resp.status())));
            }

            let body = resp.text().map_err(|e| QueryFault::Other(e.to_string()))?;
            let ways = super::parse_overpass_str(&body)
                .map_err(|e| QueryFault::Other(e.to_string()))?;
            self.queries.pop_front();
            Ok(Some(ways))
        }
    }
}
