//! Hash-derived pseudo-embeddings for offline and development use.
//!
//! The vector for a text is the SHA-256 digest of its UTF-8 bytes, each byte
//! scaled into `[0, 1]`, repeated cyclically to fill the requested dimension.
//! No random state or seeded hashing is involved, so the output is
//! bit-identical across processes and platforms.

use sha2::{Digest, Sha256};

use super::{EmbeddingProvider, ProviderError};

/// Model name reported when the deterministic path is used
pub const DETERMINISTIC_MODEL: &str = "deterministic-fake";

/// Build the deterministic embedding of `text` with `dim` components
pub fn deterministic_embedding(text: &str, dim: usize) -> Vec<f32> {
    if text.is_empty() {
        return vec![0.0; dim];
    }

    let digest = Sha256::digest(text.as_bytes());
    digest
        .iter()
        .map(|byte| f32::from(*byte) / 255.0)
        .cycle()
        .take(dim)
        .collect()
}

/// Provider backed by [`deterministic_embedding`]
#[derive(Debug, Clone)]
pub struct DeterministicEmbedder {
    dimension: usize,
}

impl DeterministicEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        deterministic_embedding(text, self.dimension)
    }
}

impl EmbeddingProvider for DeterministicEmbedder {
    async fn embed_batch(
        &self,
        texts: &[String],
        _task_type: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn model_name(&self) -> &str {
        DETERMINISTIC_MODEL
    }

    fn max_batch_size(&self) -> usize {
        usize::MAX
    }
}
