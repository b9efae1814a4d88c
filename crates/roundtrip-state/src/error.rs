//! State store error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    /// File I/O error.
    #[error("failed to {operation} state file {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON of the expected shape.
    #[error("failed to parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("failed to move {temp_path} into place at {target_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StateError>;
