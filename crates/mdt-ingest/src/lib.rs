//! `mdt-ingest` — translates raw external formats into an `mdt-network` graph.
//!
//! This is the only crate that knows about source formats.  Everything
//! downstream sees [`mdt_network::Network`] and [`SurveyPoint`]s.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`topology`] | `TopologySource`, `RawWay`, `QueryFault`, `RetryPolicy`, `build_topology_network` |
//! | [`tags`]     | Tag → `SegmentAttributes` default table                    |
//! | [`overpass`] | Overpass JSON parsing (+ live HTTP source with `overpass`) |
//! | [`flow`]     | Flow-dataset JSON → network, coordinate-derived node keys  |
//! | [`survey`]   | Vehicle-count CSV → `SurveyPoint`s                         |
//! | [`osm`]      | OSM PBF topology source (feature `osm`)                    |
//! | [`error`]    | `IngestError`, `IngestResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `osm`      | Enables [`osm::OsmPbfSource`] via `osmpbf`.               |
//! | `overpass` | Enables `overpass::OverpassSource` via `reqwest`.         |
//! | `serde`    | Propagates serde derives to network types.                |

pub mod error;
pub mod flow;
pub mod overpass;
pub mod survey;
pub mod tags;
pub mod topology;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use error::{IngestError, IngestResult};
pub use flow::{FlowSegmentRecord, build_flow_network, flow_node_id, load_flow_json, load_flow_reader};
pub use overpass::{load_overpass_json, parse_overpass_reader, parse_overpass_str};
pub use survey::{SurveyPoint, load_survey_csv, load_survey_reader};
pub use tags::attributes_from_tags;
pub use topology::{
    BatchSource, QueryFault, RawNode, RawWay, RetryPolicy, TopologySource, build_topology_network,
    fetch_with_retry, network_from_ways,
};
