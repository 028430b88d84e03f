use rig::embeddings::{Embedding, EmbeddingModel};
use tracing::{Instrument, info_span};

use super::{EmbeddingProvider, ProviderError};

/// Narrow a `rig` embedding to the `f32` vectors this crate returns
pub trait EmbeddingConversion {
    fn to_vec(&self) -> Vec<f32>;
}

impl EmbeddingConversion for Embedding {
    fn to_vec(&self) -> Vec<f32> {
        self.vec.iter().map(|f| *f as f32).collect()
    }
}

/// Exposes any `rig` embedding model as an [`EmbeddingProvider`].
///
/// `rig` models have no notion of a task hint, so it is ignored.
#[derive(Clone)]
pub struct RigEmbeddingProvider<M: EmbeddingModel> {
    model: M,
    model_name: String,
}

impl<M: EmbeddingModel> RigEmbeddingProvider<M> {
    pub fn new(model: M, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    pub fn ndims(&self) -> usize {
        self.model.ndims()
    }
}

impl RigEmbeddingProvider<rig::providers::gemini::embedding::EmbeddingModel> {
    /// Gemini `text-embedding-004` through the Generative Language API
    pub fn gemini(api_key: &str) -> Self {
        use rig::providers::gemini;

        let client = gemini::Client::new(api_key);
        Self::new(
            client.embedding_model(gemini::embedding::EMBEDDING_004),
            gemini::embedding::EMBEDDING_004,
        )
    }
}

impl<M: EmbeddingModel> EmbeddingProvider for RigEmbeddingProvider<M> {
    async fn embed_batch(
        &self,
        texts: &[String],
        _task_type: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        let embeddings = self
            .model
            .embed_texts(texts.to_vec())
            .instrument(info_span!("embed_texts", model = %self.model_name))
            .await?;
        Ok(embeddings.iter().map(EmbeddingConversion::to_vec).collect())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn max_batch_size(&self) -> usize {
        M::MAX_DOCUMENTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_conversion() {
        let embedding = Embedding {
            document: "doc".to_string(),
            vec: vec![1.0, 2.5, -3.0],
        };

        assert_eq!(embedding.to_vec(), vec![1.0f32, 2.5, -3.0]);
    }

    #[test]
    fn test_gemini_provider_identity() {
        let provider = RigEmbeddingProvider::gemini("test-key");
        assert_eq!(
            provider.model_name(),
            rig::providers::gemini::embedding::EMBEDDING_004
        );
        assert!(provider.max_batch_size() > 0);
    }
}
