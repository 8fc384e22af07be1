use thiserror::Error;

use mdt_network::NetworkError;

use crate::QueryFault;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// A topology-source fault that is not retried.
    #[error("topology query failed: {0}")]
    Query(QueryFault),

    #[error("way {way} references node {node} absent from the result")]
    MissingNode { way: u64, node: u64 },

    #[error("OSM PBF error: {0}")]
    Osm(String),
}

pub type IngestResult<T> = Result<T, IngestError>;
