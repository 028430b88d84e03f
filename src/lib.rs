//! # vecgate - Deduplicating embedding gateway
//!
//! This crate sits between callers that need text embeddings and a remote,
//! quota-limited embedding provider (Vertex AI). It keeps provider usage low
//! and inside the quota while returning exactly one vector per input text, in
//! input order.
//!
//! ## Features
//!
//! - Normalization-based deduplication: texts that differ only in case,
//!   Unicode compatibility form or whitespace are embedded once
//! - A process-wide sliding window rate limiter shared by every request
//! - Batching of unique texts with exponential backoff retries per batch
//! - A lazily created provider session, initialized once under concurrency
//! - A deterministic offline mode for tests and local development
//! - Sentence splitting for per-sentence embedding
//!
//! ## Example
//!
//! ```rust,no_run
//! use vecgate::processor::{EmbeddingConfig, EmbeddingService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EmbeddingConfig::from_env()?;
//!     let service = EmbeddingService::vertex(config)?;
//!
//!     let texts = vec!["Hello world".to_string(), "hello   WORLD".to_string()];
//!     let vectors = service.generate_embeddings(&texts, "example-1").await?;
//!
//!     assert_eq!(vectors[0], vectors[1]);
//!     Ok(())
//! }
//! ```

pub mod dedup;
mod error;
pub mod limiter;
pub mod model;
pub mod processor;
pub mod request;
pub mod retry;
pub mod sentences;
pub mod session;
pub mod vertex;

pub use error::{Error, Result};

/// Re-export of the commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::model::{EmbeddingProvider, ProviderError};
    pub use crate::processor::{
        EmbeddingConfig, EmbeddingService, GeminiEmbeddingService, RequestLimits,
    };
    pub use crate::request::{EmbedRequest, EmbedResponse, SentenceEmbedResponse};
    pub use crate::sentences::{RegexSentenceSplitter, SentenceSplitter};
}
