//! # Embedding Model Module
//!
//! This module defines the seam between the orchestration core and whatever
//! actually turns text into vectors, plus the wrapper that makes remote calls
//! safe to issue against a quota.
//!
//! ## Key Components
//!
//! - `EmbeddingProvider`: a batch of texts in, one vector per text out, same order
//! - `RateLimitedEmbeddingModel`: consults the shared rate limiter before every
//!   physical call and retries failed calls with exponential backoff
//! - `DeterministicEmbedder`: hash-derived offline vectors
//! - `RigEmbeddingProvider`: adapts any `rig` embedding model to the seam
//!
//! Providers report failures as `ProviderError`; the rate limited model turns
//! exhausted retries into the opaque `Error::ProviderUnavailable`.

use std::future::Future;

pub mod deterministic;
pub mod embedding;
mod error;
pub mod ratelimited_embedding;

#[cfg(test)]
pub(crate) mod mock_model;

pub use deterministic::{DeterministicEmbedder, deterministic_embedding};
pub use embedding::{EmbeddingConversion, RigEmbeddingProvider};
pub use error::ProviderError;
pub use ratelimited_embedding::RateLimitedEmbeddingModel;

/// Task hint forwarded to providers that support it
pub const DEFAULT_TASK_TYPE: &str = "RETRIEVAL_DOCUMENT";

/// A remote (or local) embedding backend
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one batch. Implementations return exactly one vector per input,
    /// in input order.
    fn embed_batch(
        &self,
        texts: &[String],
        task_type: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, ProviderError>> + Send;

    /// The model identifier reported to callers
    fn model_name(&self) -> &str;

    /// Largest batch accepted in one call
    fn max_batch_size(&self) -> usize;
}
