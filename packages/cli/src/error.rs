//! Error types for the microcosm CLI.

use std::path::PathBuf;

use microcosm_runtime::RuntimeError;
use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid scheduler JSON.
    #[error("cannot parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The demo was asked for an impossible shape.
    #[error("invalid options: {0}")]
    Options(String),

    /// A runtime error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
