//! Error types for reconciliation and pipeline runs.

use std::path::PathBuf;

use thiserror::Error;

use roundtrip_ingest::{GitError, IngestError};
use roundtrip_model::{ModelError, Stage};
use roundtrip_service::ServiceError;

/// Fatal errors that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("conversion service unavailable: {0}")]
    Service(#[from] ServiceError),
}

impl RunError {
    /// Remediation hint for setup errors, when one is known.
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::Git(error) => error.remediation(),
            Self::Ingest(IngestError::DirectoryNotFound { path }) => Some(format!(
                "check that the corpus checkout contains {}",
                path.display()
            )),
            Self::Service(_) => {
                Some("start the conversion service or fix its restart command".to_string())
            }
            _ => None,
        }
    }
}

/// Why a single stage failed.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    /// Returns true when the failure calls for a service restart.
    pub fn is_service_fault(&self) -> bool {
        matches!(self, Self::Service(error) if error.is_service_fault())
    }
}

/// A failed stage; displays as the failure-marker text.
#[derive(Debug, Error)]
#[error("{stage}: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: StageError,
}

impl StageFailure {
    pub fn new(stage: Stage, error: impl Into<StageError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}
