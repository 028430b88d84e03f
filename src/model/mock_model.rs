//! # Mock Embedding Provider for Testing
//!
//! Provides a `MockEmbeddingProvider` that implements `EmbeddingProvider` for
//! use in tests. It can be scripted to fail a number of calls, or to return a
//! short response, and records every batch it receives so tests can assert
//! how many physical calls were made and with what.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{EmbeddingProvider, ProviderError, deterministic_embedding};

/// A mock provider returning deterministic vectors.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
    max_batch_size: usize,
    fail_first: usize,
    short_first: usize,
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
    task_types: Mutex<Vec<Option<String>>>,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_batch_size: 5,
            fail_first: 0,
            short_first: 0,
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
            task_types: Mutex::new(Vec::new()),
        }
    }

    /// Fail the first `n` calls with a 503
    pub fn fail_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    /// Return one vector too few on the first `n` calls
    pub fn drop_last_vector_first(mut self, n: usize) -> Self {
        self.short_first = n;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Number of physical calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every batch received, in call order
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    /// All texts sent across every batch
    pub fn embedded_texts(&self) -> Vec<String> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn task_types(&self) -> Vec<Option<String>> {
        self.task_types.lock().unwrap().clone()
    }
}

impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(
        &self,
        texts: &[String],
        task_type: Option<&str>,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(texts.to_vec());
        self.task_types
            .lock()
            .unwrap()
            .push(task_type.map(str::to_string));

        if call < self.fail_first {
            return Err(ProviderError::Api {
                status_code: 503,
                message: "service unavailable".to_string(),
            });
        }

        let mut vectors: Vec<Vec<f32>> = texts
            .iter()
            .map(|t| deterministic_embedding(t, self.dimension))
            .collect();
        if call < self.short_first {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
