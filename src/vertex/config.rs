//! # Vertex AI Configuration
//!
//! Identity of the remote embedding model: which project, region and model to
//! call, plus the credentials and timeout used for each request.

use std::time::Duration;

/// Default region for Vertex AI requests
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Default embedding model
pub const DEFAULT_MODEL: &str = "text-embedding-004";

/// Configuration for the Vertex AI embedding provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexConfig {
    /// GCP project; required when remote mode is used
    pub project_id: Option<String>,

    /// Region, e.g. `us-central1`
    pub location: String,

    /// Publisher model name
    pub model: String,

    /// OAuth access token. When absent one is requested from `gcloud`.
    pub access_token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Largest batch sent in a single predict call
    pub max_batch_size: usize,
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            access_token: None,
            timeout: Duration::from_secs(30),
            max_batch_size: 250,
        }
    }
}

impl VertexConfig {
    /// Project id, ignoring blank values
    pub fn project(&self) -> Option<&str> {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VertexConfig::default();
        assert_eq!(config.location, "us-central1");
        assert_eq!(config.model, "text-embedding-004");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.project().is_none());
    }

    #[test]
    fn test_blank_project_is_absent() {
        let config = VertexConfig {
            project_id: Some("   ".to_string()),
            ..VertexConfig::default()
        };
        assert!(config.project().is_none());

        let config = VertexConfig {
            project_id: Some(" my-project ".to_string()),
            ..VertexConfig::default()
        };
        assert_eq!(config.project(), Some("my-project"));
    }
}
