//! Batch orchestration for embedding requests
//!
//! This module turns a list of texts into one vector per text. Duplicates
//! (after normalization) are embedded once, unique texts are sent to the
//! provider in batches, and the results are fanned back out in input order.

mod config;

pub use config::{EmbeddingConfig, EmbeddingConfigBuilder, RequestLimits};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::dedup::DedupPlan;
use crate::error::{Error, Result};
use crate::limiter::RateLimiter;
use crate::model::deterministic::DETERMINISTIC_MODEL;
use crate::model::{
    DeterministicEmbedder, EmbeddingProvider, RateLimitedEmbeddingModel, RigEmbeddingProvider,
};
use crate::session::ProviderSession;
use crate::vertex::VertexEmbeddingModel;

/// Where the vectors come from
#[derive(Debug)]
pub enum ProviderBackend<P> {
    /// Hash-derived vectors, no network
    Deterministic(DeterministicEmbedder),

    /// A remote provider created on first use
    Remote(ProviderSession<P>),
}

/// Embedding orchestration service
///
/// One service is meant to be shared by every concurrent request: the rate
/// limiter and provider session it owns are the process-wide quota and
/// connection.
#[derive(Debug)]
pub struct EmbeddingService<P = VertexEmbeddingModel> {
    config: EmbeddingConfig,
    backend: ProviderBackend<P>,
    limiter: Arc<RateLimiter>,
}

impl EmbeddingService<VertexEmbeddingModel> {
    /// Service for the given configuration.
    ///
    /// In remote mode the Vertex AI model is connected lazily on the first
    /// request that needs it. A missing project id is reported here.
    pub fn vertex(config: EmbeddingConfig) -> Result<Self> {
        config.validate()?;
        if config.use_fake_embeddings {
            return Ok(Self::deterministic(config));
        }
        let session = VertexEmbeddingModel::session(config.vertex.clone());
        Ok(Self::with_session(config, session))
    }
}

/// Gemini `text-embedding-004` reached through `rig`
pub type GeminiEmbeddingService =
    EmbeddingService<RigEmbeddingProvider<rig::providers::gemini::embedding::EmbeddingModel>>;

impl GeminiEmbeddingService {
    /// Service backed by the Gemini API instead of Vertex AI.
    ///
    /// Offline mode ignores the key. Otherwise a blank key is a configuration
    /// error.
    pub fn gemini(config: EmbeddingConfig, api_key: &str) -> Result<Self> {
        if config.embedding_dim == 0 {
            return Err(Error::Configuration(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        if config.use_fake_embeddings {
            return Ok(Self::deterministic(config));
        }
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::Configuration(
                "GEMINI_API_KEY must be set for Gemini embeddings".to_string(),
            ));
        }
        Ok(Self::with_provider(config, RigEmbeddingProvider::gemini(api_key)))
    }
}

impl<P: EmbeddingProvider + 'static> EmbeddingService<P> {
    /// Service around an already constructed provider
    pub fn with_provider(config: EmbeddingConfig, provider: P) -> Self {
        Self::with_session(config, ProviderSession::ready(provider))
    }

    /// Service around a provider session
    pub fn with_session(config: EmbeddingConfig, session: ProviderSession<P>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.max_calls_per_minute));
        Self {
            config,
            backend: ProviderBackend::Remote(session),
            limiter,
        }
    }

    /// Offline service; never touches the network
    pub fn deterministic(config: EmbeddingConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.max_calls_per_minute));
        Self {
            backend: ProviderBackend::Deterministic(DeterministicEmbedder::new(
                config.embedding_dim,
            )),
            config,
            limiter,
        }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    pub fn backend(&self) -> &ProviderBackend<P> {
        &self.backend
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self.backend, ProviderBackend::Deterministic(_))
    }

    /// Model name reported in responses
    pub fn model_label(&self) -> String {
        match &self.backend {
            ProviderBackend::Deterministic(_) => DETERMINISTIC_MODEL.to_string(),
            ProviderBackend::Remote(session) => session
                .get()
                .map(|provider| provider.model_name().to_string())
                .unwrap_or_else(|| self.config.vertex.model.clone()),
        }
    }

    /// Embed `texts`, returning one vector per input in input order.
    ///
    /// Texts that normalize to the same key share one embedding and cost one
    /// provider slot. Empty input returns an empty list without creating the
    /// provider session.
    #[instrument(skip_all, fields(correlation_id = %correlation_id, count = texts.len()))]
    pub async fn generate_embeddings(
        &self,
        texts: &[String],
        correlation_id: &str,
    ) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            debug!(correlation_id, "No texts to embed");
            return Ok(Vec::new());
        }

        let plan = DedupPlan::build(texts);
        info!(
            correlation_id,
            input_count = plan.original_len(),
            unique_count = plan.unique_len(),
            "Embedding request deduplicated"
        );

        let unique = plan.unique_texts();
        let vectors = match &self.backend {
            ProviderBackend::Deterministic(embedder) => {
                unique.iter().map(|text| embedder.embed(text)).collect()
            }
            ProviderBackend::Remote(session) => {
                self.embed_remote(session, &unique, correlation_id).await?
            }
        };

        for (slot, vector) in vectors.iter().enumerate() {
            if vector.len() != self.config.embedding_dim {
                warn!(
                    correlation_id,
                    slot,
                    expected = self.config.embedding_dim,
                    actual = vector.len(),
                    "Embedding dimension mismatch"
                );
            }
        }

        plan.reassemble(vectors)
    }

    async fn embed_remote(
        &self,
        session: &ProviderSession<P>,
        unique: &[String],
        correlation_id: &str,
    ) -> Result<Vec<Vec<f32>>> {
        let provider = session.get_or_init(correlation_id).await?.clone();
        let model = RateLimitedEmbeddingModel::new(provider, self.limiter.clone(), self.config.retry)
            .with_task_type(self.config.task_type.as_str());

        let batch_size = self
            .config
            .effective_batch_size()
            .min(model.model().max_batch_size())
            .max(1);

        let mut vectors = Vec::with_capacity(unique.len());
        for (index, batch) in unique.chunks(batch_size).enumerate() {
            debug!(correlation_id, batch = index, size = batch.len(), "Sending batch");
            vectors.extend(model.embed_batch(batch, correlation_id).await?);
        }

        if vectors.len() != unique.len() {
            return Err(Error::Validation(format!(
                "provider returned {} embeddings for {} unique texts",
                vectors.len(),
                unique.len()
            )));
        }
        Ok(vectors)
    }
}
