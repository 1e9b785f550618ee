//! Error types for citemap.

use std::time::Duration;

/// Errors that can occur while resolving a scholar and mapping their citations.
#[derive(Debug, thiserror::Error)]
pub enum CiteMapError {
    /// HTTP request failed (network, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream API returned an error status code.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited by an upstream API (HTTP 429).
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Failed to parse an upstream response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The profile URL or name could not be understood.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Author or resource not found (HTTP 404 or empty search).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The data source could not deliver the author record.
    #[error("Upstream source unavailable: {0}")]
    Upstream(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Socket or filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CiteMapError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Convenience alias for Results using [`CiteMapError`].
pub type Result<T> = std::result::Result<T, CiteMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CiteMapError::RateLimited { retry_after: None }.is_transient());
        assert!(CiteMapError::Api {
            status: 502,
            message: String::new()
        }
        .is_transient());
        assert!(!CiteMapError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
        assert!(!CiteMapError::NotFound("x".into()).is_transient());
    }
}
