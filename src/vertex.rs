//! Vertex AI embedding provider
//!
//! This module talks to the Vertex AI `:predict` endpoint of a publisher text
//! embedding model. `VertexEmbeddingModel::session` builds the lazily
//! connected provider session used by the orchestration service.

mod auth;
mod config;
mod embedding;
mod http;
mod types;

pub use config::{DEFAULT_LOCATION, DEFAULT_MODEL, VertexConfig};
pub use embedding::VertexEmbeddingModel;

/// Re-export of the wire types for public use
pub mod prelude {
    pub use super::types::*;
}
