//! Error types for ensemble-ai

use thiserror::Error;

/// Result type alias using ensemble-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the inference endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status other than 429
    #[error("API error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded and retries exhausted
    #[error("Rate limited: retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// Required credential is not set
    #[error("Missing required environment variable: {0}")]
    MissingCredential(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an API error from a status code and body
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only rate limiting is retried; everything else is fatal for the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}
