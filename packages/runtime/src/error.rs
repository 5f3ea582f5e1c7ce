//! Error types for the microcosm runtime.

use thiserror::Error;

/// Errors that can occur in the microcosm runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A `recv` or `collect` found no message in the named box.
    ///
    /// Callers are expected to guard with `data_ready`/`data_out_ready`,
    /// so seeing this usually means a missing guard.
    #[error("box '{box_name}' is empty")]
    EmptyQueue { box_name: String },

    /// A microprocess reported an abnormal termination from its step.
    #[error("microprocess '{process}' failed: {message}")]
    Failed { process: String, message: String },

    /// A microprocess panicked while being stepped.
    #[error("microprocess '{process}' panicked: {message}")]
    Panicked { process: String, message: String },

    /// Scheduler configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RuntimeError {
    /// Shorthand for an [`RuntimeError::EmptyQueue`] on the given box.
    pub fn empty_queue(box_name: impl Into<String>) -> Self {
        RuntimeError::EmptyQueue {
            box_name: box_name.into(),
        }
    }

    /// Shorthand for a [`RuntimeError::Failed`] raised by a microprocess.
    pub fn failed(process: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Failed {
            process: process.into(),
            message: message.into(),
        }
    }

    /// Whether this is an empty-box error.
    pub fn is_empty_queue(&self) -> bool {
        matches!(self, RuntimeError::EmptyQueue { .. })
    }
}

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
