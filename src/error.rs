//! Paddock error types

use std::time::Duration;

/// Paddock error types
#[derive(Debug, thiserror::Error)]
pub enum PaddockError {
    // Upstream/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("not found: {0}")]
    NotFound(String),

    /// The upstream call did not finish before its deadline.
    ///
    /// The call itself may still be running; its result is discarded.
    #[error("upstream timed out after {after:?}, try again")]
    Timeout { after: Duration },

    #[error("upstream error: {0}")]
    Upstream(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid session key: {0}")]
    InvalidKey(String),

    // Configuration errors
    #[error("no race data provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PaddockError {
    /// Whether a later call may succeed where this one failed.
    ///
    /// The cache layer never retries on its own; this is advisory for
    /// callers deciding what to tell the user.
    pub fn is_transient(&self) -> bool {
        match self {
            PaddockError::Timeout { .. }
            | PaddockError::RateLimited { .. }
            | PaddockError::Http(_)
            | PaddockError::Upstream(_) => true,
            PaddockError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider-suggested wait, only set on `RateLimited`.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PaddockError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PaddockError::NotFound(_))
    }

    /// Failures after which an expired schedule snapshot may be served.
    pub(crate) fn allows_stale_fallback(&self) -> bool {
        matches!(
            self,
            PaddockError::RateLimited { .. } | PaddockError::Timeout { .. }
        )
    }
}

impl From<reqwest::Error> for PaddockError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // Client-side timeout; the executor deadline is the one callers see.
            PaddockError::Http(format!("request timed out: {err}"))
        } else {
            PaddockError::Http(err.to_string())
        }
    }
}

/// Result type alias for Paddock operations
pub type Result<T> = std::result::Result<T, PaddockError>;
