//! Error types for the conversion service.

use thiserror::Error;

/// Errors raised while talking to, or recovering, the conversion service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The request never produced an HTTP response (refused, reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The service processed the request but reported a translation failure.
    #[error("XSugar exception: {cause}")]
    Translation {
        /// Cause reported by the service.
        cause: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The restart command could not be run or exited unsuccessfully.
    #[error("restart command `{command}` failed: {details}")]
    Restart {
        /// Command line that was run.
        command: String,
        /// Exit status or spawn error.
        details: String,
    },

    /// The service did not become healthy within the poll budget.
    #[error("conversion service still unhealthy after {attempts} health checks")]
    Unhealthy {
        /// Number of polls made after the restart.
        attempts: u32,
    },
}

impl ServiceError {
    /// Returns whether this error means the service instance itself is broken
    /// and should be restarted.
    ///
    /// Translation exceptions are content problems and never qualify.
    #[must_use]
    pub fn is_service_fault(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
