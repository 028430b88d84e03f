//! Request and response envelopes
//!
//! These types sit at the transport boundary. They validate what comes in
//! and shape what goes out; the orchestration service never sees them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::processor::RequestLimits;

/// A batch of texts to embed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedRequest {
    pub texts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl EmbedRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Reject requests the service should never be asked to process.
    ///
    /// Lengths are counted in characters after trimming.
    pub fn validate(&self, limits: &RequestLimits) -> Result<()> {
        if self.texts.is_empty() {
            return Err(Error::Validation("texts must not be empty".to_string()));
        }
        if self.texts.len() > limits.max_texts_per_request {
            return Err(Error::Validation(format!(
                "too many texts: {} (max {})",
                self.texts.len(),
                limits.max_texts_per_request
            )));
        }

        let mut total = 0usize;
        for (index, text) in self.texts.iter().enumerate() {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(Error::Validation(format!(
                    "text at index {index} is empty or whitespace"
                )));
            }
            let length = trimmed.chars().count();
            if length > limits.max_text_length {
                return Err(Error::Validation(format!(
                    "text at index {index} is too long: {length} characters (max {})",
                    limits.max_text_length
                )));
            }
            total += length;
        }

        if total > limits.max_total_chars {
            return Err(Error::Validation(format!(
                "request too large: {total} characters (max {})",
                limits.max_total_chars
            )));
        }
        Ok(())
    }

    /// The caller's correlation id, or a fresh one
    pub fn correlation_id_or_new(&self) -> String {
        self.correlation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(new_correlation_id)
    }
}

/// Fresh random (v4 UUID) correlation id
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Vectors for an `EmbedRequest`, one per input text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub dimension: usize,
    pub model: String,
    pub processing_time_ms: u64,
    pub correlation_id: String,
}

impl EmbedResponse {
    pub fn new(
        embeddings: Vec<Vec<f32>>,
        model: impl Into<String>,
        processing_time_ms: u64,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            dimension: embeddings.first().map_or(0, Vec::len),
            embeddings,
            model: model.into(),
            processing_time_ms,
            correlation_id: correlation_id.into(),
        }
    }
}

/// Sentences of a document together with their vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceEmbedResponse {
    pub sentences: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub dimension: usize,
    pub model: String,
    pub processing_time_ms: u64,
    pub correlation_id: String,
}

impl SentenceEmbedResponse {
    pub fn new(sentences: Vec<String>, response: EmbedResponse) -> Self {
        Self {
            sentences,
            embeddings: response.embeddings,
            dimension: response.dimension,
            model: response.model,
            processing_time_ms: response.processing_time_ms,
            correlation_id: response.correlation_id,
        }
    }
}
