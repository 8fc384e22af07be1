//! Errors raised by `mdt-core` parsing.

use thiserror::Error;

/// The error type for `mdt-core`.  Currently only [`SpeedLimit`][crate::SpeedLimit]
/// parsing fails.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `mdt-core`.
pub type CoreResult<T> = Result<T, CoreError>;
