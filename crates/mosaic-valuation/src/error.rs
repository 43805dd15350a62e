//! Error types for valuation operations

use thiserror::Error;

/// Valuation service specific errors
#[derive(Debug, Error)]
pub enum ValuationError {
    /// Upstream market-data API answered with an error
    #[error("Market data API error: {0}")]
    ApiError(String),

    /// Upstream returned fewer usable points than requested
    #[error("Insufficient market data: expected {expected} points, got {actual}")]
    InsufficientData {
        expected: usize,
        actual: usize,
    },

    /// Rate limit exceeded for an upstream provider
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;
