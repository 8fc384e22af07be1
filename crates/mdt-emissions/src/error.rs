//! Emissions error type.

use thiserror::Error;

/// Errors produced by `mdt-emissions`.
///
/// The engine itself never fails: a combination without a formula is skipped.
/// These cover reading and checking parameter and scenario files.
#[derive(Debug, Error)]
pub enum EmissionsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("invalid emission parameters: {0}")]
    Config(String),

    #[error("invalid scenario: {0}")]
    Scenario(String),
}

pub type EmissionsResult<T> = Result<T, EmissionsError>;
