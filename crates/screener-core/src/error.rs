//! Error types for screener operations.
//!
//! This module defines [`ScreenerError`] which covers every failure a data
//! collaborator can report. The scoring core itself never produces one: when a
//! snapshot or price series cannot be obtained the core is simply not invoked.

use thiserror::Error;

/// Errors that can occur while fetching, parsing, caching or screening data.
#[derive(Error, Debug)]
pub enum ScreenerError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The provider rejected the session credentials.
    #[error("Unauthorized by {0}")]
    Unauthorized(String),

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered but had nothing to score for the symbol.
    #[error("No data available for {0}")]
    DataNotAvailable(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested feature is not supported.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// The operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl ScreenerError {
    /// Returns true if repeating the request may succeed.
    ///
    /// Only transport failures and rate limiting are retried; a missing symbol
    /// or a malformed payload will not fix itself.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. })
    }
}

/// Result type alias using [`ScreenerError`].
pub type Result<T> = std::result::Result<T, ScreenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_variants() {
        assert!(ScreenerError::Network("reset".to_string()).is_retryable());
        assert!(
            ScreenerError::RateLimited {
                provider: "Yahoo Finance".to_string(),
                retry_after: None,
            }
            .is_retryable()
        );
        assert!(!ScreenerError::SymbolNotFound("XYZ".to_string()).is_retryable());
        assert!(!ScreenerError::Parse("bad json".to_string()).is_retryable());
        assert!(!ScreenerError::Cancelled.is_retryable());
        assert!(!ScreenerError::Unauthorized("Yahoo Finance".to_string()).is_retryable());
    }

    #[test]
    fn test_data_not_available_message() {
        let err = ScreenerError::DataNotAvailable("TCS.NS".to_string());
        assert_eq!(err.to_string(), "No data available for TCS.NS");
    }
}
