//! Pipeline error type.

use thiserror::Error;

use mdt_emissions::EmissionsError;
use mdt_ingest::IngestError;
use mdt_match::MatchError;
use mdt_network::NetworkError;

/// Errors produced by [`Pipeline::run`][crate::Pipeline::run] and the builder.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline input missing: {0}")]
    MissingInput(&'static str),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("match error: {0}")]
    Match(#[from] MatchError),

    #[error("emissions error: {0}")]
    Emissions(#[from] EmissionsError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
