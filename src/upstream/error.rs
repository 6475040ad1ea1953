//! Classified upstream failures.

use thiserror::Error;

/// Failure of a call to a dependency.
///
/// `Client` is a caller-side fault and is never retried. `Server` is a
/// dependency-side fault (5xx, transport, undecodable payload) and is retried
/// under the configured policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("{message}")]
    Client { message: String, status: u16 },

    #[error("{message}")]
    Server { message: String },
}

impl UpstreamError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpstreamError::Server { .. })
    }

    pub fn is_client(&self) -> bool {
        matches!(self, UpstreamError::Client { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            UpstreamError::Client { message, .. } | UpstreamError::Server { message } => message,
        }
    }

    /// Status code reported by the dependency, kept for client errors only.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Client { status, .. } => Some(*status),
            UpstreamError::Server { .. } => None,
        }
    }

    /// Metrics label for this failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Client { .. } => "client_error",
            UpstreamError::Server { .. } => "server_error",
        }
    }
}

/// Result of one call to a dependency.
pub type UpstreamOutcome<T> = Result<T, UpstreamError>;
