//! # Embedding Service Configuration Module
//!
//! This module provides the configuration structures and builder for the
//! embedding orchestration service: output dimension, provider quota, batch
//! size, offline mode, retry schedule, request limits and the Vertex AI
//! identity.
//!
//! ## Key Components
//!
//! - `RequestLimits`: Size limits enforced on incoming requests
//! - `EmbeddingConfig`: Complete configuration for the service
//! - `EmbeddingConfigBuilder`: Builder pattern implementation for easier configuration
//!
//! ## Environment
//!
//! `EmbeddingConfig::from_env` reads the following variables, falling back to
//! the defaults for anything unset:
//!
//! | Variable | Field |
//! |---|---|
//! | `NLP_EMBEDDING_DIM` | `embedding_dim` |
//! | `NLP_VERTEX_MAX_CALLS_PER_MINUTE` | `max_calls_per_minute` |
//! | `NLP_VERTEX_BATCH_SIZE` | `batch_size` |
//! | `NLP_USE_FAKE_EMBEDDINGS` | `use_fake_embeddings` |
//! | `NLP_VERTEX_TASK_TYPE` | `task_type` |
//! | `NLP_VERTEX_MODEL` | `vertex.model` |
//! | `NLP_VERTEX_TIMEOUT_SECONDS` | `vertex.timeout` |
//! | `VERTEX_PROJECT_ID` | `vertex.project_id` |
//! | `VERTEX_LOCATION` | `vertex.location` |
//! | `VERTEX_ACCESS_TOKEN` | `vertex.access_token` |
//! | `NLP_MAX_TEXTS_PER_REQUEST` | `limits.max_texts_per_request` |
//! | `NLP_MAX_TEXT_LENGTH` | `limits.max_text_length` |
//! | `NLP_MAX_TOTAL_CHARS` | `limits.max_total_chars` |

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::DEFAULT_TASK_TYPE;
use crate::retry::RetryPolicy;
use crate::vertex::VertexConfig;

/// Limits applied to a request before it reaches the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLimits {
    /// Maximum number of texts in one request
    pub max_texts_per_request: usize,

    /// Maximum characters in a single text, after trimming
    pub max_text_length: usize,

    /// Maximum characters across all texts, after trimming
    pub max_total_chars: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_texts_per_request: 100,
            max_text_length: 50_000,
            max_total_chars: 500_000,
        }
    }
}

/// Configuration for the embedding service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Expected length of every embedding vector
    pub embedding_dim: usize,

    /// Ceiling on physical provider calls per 60 seconds; 0 disables limiting.
    /// Negative values from the environment are read as 0.
    pub max_calls_per_minute: u32,

    /// Unique texts per provider call
    pub batch_size: usize,

    /// Use hash-derived vectors instead of the remote provider
    pub use_fake_embeddings: bool,

    /// Task hint sent with every remote call
    pub task_type: String,

    /// Retry schedule for remote calls
    pub retry: RetryPolicy,

    /// Request size limits
    pub limits: RequestLimits,

    /// Remote provider identity
    pub vertex: VertexConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 768,
            max_calls_per_minute: 5,
            batch_size: 5,
            use_fake_embeddings: false,
            task_type: DEFAULT_TASK_TYPE.to_string(),
            retry: RetryPolicy::default(),
            limits: RequestLimits::default(),
            vertex: VertexConfig::default(),
        }
    }
}

impl EmbeddingConfig {
    /// Create a new builder
    pub fn builder() -> EmbeddingConfigBuilder {
        EmbeddingConfigBuilder::new()
    }

    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let vertex = VertexConfig {
            project_id: get("VERTEX_PROJECT_ID"),
            location: get("VERTEX_LOCATION").unwrap_or(defaults.vertex.location),
            model: get("NLP_VERTEX_MODEL").unwrap_or(defaults.vertex.model),
            access_token: get("VERTEX_ACCESS_TOKEN"),
            timeout: match get("NLP_VERTEX_TIMEOUT_SECONDS") {
                Some(v) => Duration::from_secs(parse("NLP_VERTEX_TIMEOUT_SECONDS", &v)?),
                None => defaults.vertex.timeout,
            },
            max_batch_size: defaults.vertex.max_batch_size,
        };

        let limits = RequestLimits {
            max_texts_per_request: parse_or(
                get("NLP_MAX_TEXTS_PER_REQUEST"),
                "NLP_MAX_TEXTS_PER_REQUEST",
                defaults.limits.max_texts_per_request,
            )?,
            max_text_length: parse_or(
                get("NLP_MAX_TEXT_LENGTH"),
                "NLP_MAX_TEXT_LENGTH",
                defaults.limits.max_text_length,
            )?,
            max_total_chars: parse_or(
                get("NLP_MAX_TOTAL_CHARS"),
                "NLP_MAX_TOTAL_CHARS",
                defaults.limits.max_total_chars,
            )?,
        };

        Ok(Self {
            embedding_dim: parse_or(
                get("NLP_EMBEDDING_DIM"),
                "NLP_EMBEDDING_DIM",
                defaults.embedding_dim,
            )?,
            max_calls_per_minute: match get("NLP_VERTEX_MAX_CALLS_PER_MINUTE") {
                Some(v) => call_ceiling(parse("NLP_VERTEX_MAX_CALLS_PER_MINUTE", &v)?),
                None => defaults.max_calls_per_minute,
            },
            batch_size: parse_or(
                get("NLP_VERTEX_BATCH_SIZE"),
                "NLP_VERTEX_BATCH_SIZE",
                defaults.batch_size,
            )?,
            use_fake_embeddings: get("NLP_USE_FAKE_EMBEDDINGS")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.use_fake_embeddings),
            task_type: get("NLP_VERTEX_TASK_TYPE").unwrap_or(defaults.task_type),
            retry: defaults.retry,
            limits,
            vertex,
        })
    }

    /// Check the configuration is usable for the selected mode.
    ///
    /// Remote mode needs a project id; offline mode does not.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            return Err(Error::Configuration(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        if self.use_fake_embeddings {
            return Ok(());
        }
        if self.vertex.project().is_none() {
            return Err(Error::Configuration(
                "VERTEX_PROJECT_ID must be set when NLP_USE_FAKE_EMBEDDINGS=false".to_string(),
            ));
        }
        Ok(())
    }

    /// Batch size actually used, never zero
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Configuration(format!("invalid value {value:?} for {name}: {e}")))
}

/// Zero or negative ceilings disable rate limiting
fn call_ceiling(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn parse_or<T: FromStr>(value: Option<String>, name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |v| parse(name, &v))
}

/// Builder for EmbeddingConfig
#[derive(Debug, Default)]
pub struct EmbeddingConfigBuilder {
    config: EmbeddingConfig,
}

impl EmbeddingConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EmbeddingConfig::default(),
        }
    }

    /// Set the embedding dimension
    pub fn embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.config.embedding_dim = embedding_dim;
        self
    }

    /// Set the provider call ceiling per minute
    pub fn max_calls_per_minute(mut self, max_calls_per_minute: u32) -> Self {
        self.config.max_calls_per_minute = max_calls_per_minute;
        self
    }

    /// Set the number of unique texts per provider call
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Switch offline (deterministic) mode on or off
    pub fn use_fake_embeddings(mut self, use_fake_embeddings: bool) -> Self {
        self.config.use_fake_embeddings = use_fake_embeddings;
        self
    }

    /// Set the task hint
    pub fn task_type(mut self, task_type: impl Into<String>) -> Self {
        self.config.task_type = task_type.into();
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the request limits
    pub fn limits(mut self, limits: RequestLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Set the Vertex AI configuration
    pub fn vertex(mut self, vertex: VertexConfig) -> Self {
        self.config.vertex = vertex;
        self
    }

    /// Set the Vertex AI project
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.vertex.project_id = Some(project_id.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> EmbeddingConfig {
        self.config
    }
}
