//! Error types for the vecgate crate

use thiserror::Error;

use crate::model::ProviderError;

/// Result type for vecgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for vecgate operations
///
/// Validation and configuration errors are kept distinct from provider
/// failures so a transport layer can tell "your request is bad" apart from
/// "the service is temporarily down".
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed input
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Remote mode selected without the required provider identity
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote provider failed on every attempt
    #[error("Embedding provider unavailable after {attempts} attempt(s)")]
    ProviderUnavailable {
        /// Number of physical calls made before giving up
        attempts: u32,
    },

    /// Provider error that is not worth retrying
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller is at fault (bad input) rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
