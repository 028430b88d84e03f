//! Error types for remote embedding providers

use thiserror::Error;

/// Error returned by a single physical provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Error reported by a wrapped provider library
    #[error("Upstream provider error: {0}")]
    Upstream(String),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Whether another attempt may succeed.
    ///
    /// Anything that came back from the remote side is retried, since the
    /// provider does not reliably separate permanent from transient failures.
    /// Only requests rejected locally are permanent.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::InvalidRequest(_))
    }
}

impl From<rig::embeddings::EmbeddingError> for ProviderError {
    fn from(err: rig::embeddings::EmbeddingError) -> Self {
        ProviderError::Upstream(err.to_string())
    }
}
