//! Wire types for the Vertex AI `:predict` embedding endpoint

use serde::{Deserialize, Serialize};

/// One text to embed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingInstance {
    /// The text content
    pub content: String,

    /// Task hint such as `RETRIEVAL_DOCUMENT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

/// Request body for `models/{model}:predict`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictRequest {
    pub instances: Vec<EmbeddingInstance>,
}

impl PredictRequest {
    pub fn new(texts: &[String], task_type: Option<&str>) -> Self {
        Self {
            instances: texts
                .iter()
                .map(|content| EmbeddingInstance {
                    content: content.clone(),
                    task_type: task_type.map(str::to_string),
                })
                .collect(),
        }
    }
}

/// Token statistics reported for each prediction
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EmbeddingStatistics {
    #[serde(default)]
    pub truncated: bool,

    #[serde(default)]
    pub token_count: f64,
}

/// The embedding of one instance
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EmbeddingValues {
    pub values: Vec<f32>,

    #[serde(default)]
    pub statistics: Option<EmbeddingStatistics>,
}

/// One entry of `predictions`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Prediction {
    pub embeddings: EmbeddingValues,
}

/// Response body for `models/{model}:predict`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

impl PredictResponse {
    /// Vectors in prediction order
    pub fn into_vectors(self) -> Vec<Vec<f32>> {
        self.predictions
            .into_iter()
            .map(|p| p.embeddings.values)
            .collect()
    }
}
