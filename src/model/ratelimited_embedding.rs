use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug_span, error, info, warn};

use super::{EmbeddingProvider, ProviderError};
use crate::error::{Error, Result};
use crate::limiter::RateLimiter;
use crate::retry::RetryPolicy;

/// Issues single batch calls against a provider, gated by a shared rate
/// limiter and retried with exponential backoff.
pub struct RateLimitedEmbeddingModel<P: EmbeddingProvider> {
    model: Arc<P>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    task_type: Option<String>,
}

impl<P: EmbeddingProvider> Clone for RateLimitedEmbeddingModel<P> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            limiter: self.limiter.clone(),
            retry: self.retry,
            task_type: self.task_type.clone(),
        }
    }
}

impl<P: EmbeddingProvider> RateLimitedEmbeddingModel<P> {
    pub fn new(model: Arc<P>, limiter: Arc<RateLimiter>, retry: RetryPolicy) -> Self {
        Self {
            model,
            limiter,
            retry,
            task_type: None,
        }
    }

    /// Forward a task hint with every call
    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        let task_type = task_type.into();
        self.task_type = (!task_type.trim().is_empty()).then(|| task_type.trim().to_string());
        self
    }

    pub fn model(&self) -> &P {
        &self.model
    }

    /// Embed one batch, returning one vector per text in input order.
    ///
    /// Every physical attempt first takes a rate limit slot. Retryable
    /// failures are retried up to the policy's attempt budget; once it is
    /// spent the caller gets `Error::ProviderUnavailable` and no further
    /// calls are made.
    pub async fn embed_batch(&self, texts: &[String], correlation_id: &str) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(ProviderError::InvalidRequest("batch is empty".to_string()).into());
        }
        let max = self.model.max_batch_size();
        if texts.len() > max {
            return Err(ProviderError::InvalidRequest(format!(
                "batch of {} texts exceeds the provider limit of {}",
                texts.len(),
                max
            ))
            .into());
        }

        let attempts = self.retry.attempts();
        for attempt in 1..=attempts {
            let delay = self.retry.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.limiter
                .acquire(correlation_id)
                .instrument(debug_span!("limiter"))
                .await;

            let start = Instant::now();
            let result = self
                .model
                .embed_batch(texts, self.task_type.as_deref())
                .await
                .and_then(|vectors| {
                    if vectors.len() == texts.len() {
                        Ok(vectors)
                    } else {
                        Err(ProviderError::UnexpectedResponse(format!(
                            "expected {} embeddings, got {}",
                            texts.len(),
                            vectors.len()
                        )))
                    }
                });

            match result {
                Ok(vectors) => {
                    info!(
                        correlation_id,
                        batch_size = texts.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        model = self.model.model_name(),
                        attempt,
                        "Provider batch embedding done"
                    );
                    return Ok(vectors);
                }
                Err(e) if !e.is_retryable() => {
                    error!(correlation_id, error = %e, "Provider rejected batch");
                    return Err(e.into());
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        correlation_id,
                        error = %e,
                        attempt,
                        max_attempts = attempts,
                        "Provider call failed, retrying"
                    );
                }
                Err(e) => {
                    error!(
                        correlation_id,
                        error = %e,
                        attempts,
                        "Provider call failed, giving up"
                    );
                }
            }
        }

        Err(Error::ProviderUnavailable { attempts })
    }
}
