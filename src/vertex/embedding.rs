//! Vertex AI text embedding model

use tracing::{debug, info, instrument};

use super::auth::resolve_access_token;
use super::config::VertexConfig;
use super::http::HttpClient;
use super::types::{PredictRequest, PredictResponse};
use crate::error::{Error, Result};
use crate::model::{EmbeddingProvider, ProviderError};
use crate::session::ProviderSession;

/// A publisher text embedding model reached through `:predict`
#[derive(Debug, Clone)]
pub struct VertexEmbeddingModel {
    http_client: HttpClient,
    model: String,
    max_batch_size: usize,
}

impl VertexEmbeddingModel {
    pub fn new(config: &VertexConfig, access_token: String) -> Result<Self> {
        Ok(Self::with_http_client(
            HttpClient::new(config, access_token)?,
            config.model.clone(),
            config.max_batch_size,
        ))
    }

    /// Establish the model handle: check the project, resolve credentials.
    ///
    /// A missing project id is a configuration error; there is no silent
    /// fallback to offline embeddings.
    pub async fn connect(config: VertexConfig) -> Result<Self> {
        let project = config.project().ok_or_else(|| {
            Error::Configuration(
                "VERTEX_PROJECT_ID is not configured for Vertex AI embeddings".to_string(),
            )
        })?;
        let access_token = resolve_access_token(&config).await?;
        let model = Self::new(&config, access_token)?;

        info!(
            project,
            model = %config.model,
            location = %config.location,
            "Initialized Vertex AI text embedding model"
        );
        Ok(model)
    }

    /// Session that connects on first use
    pub fn session(config: VertexConfig) -> ProviderSession<Self> {
        ProviderSession::lazy(move || Self::connect(config.clone()))
    }

    pub(crate) fn with_http_client(
        http_client: HttpClient,
        model: String,
        max_batch_size: usize,
    ) -> Self {
        Self {
            http_client,
            model,
            max_batch_size: max_batch_size.max(1),
        }
    }

    fn predict_path(&self) -> String {
        format!("publishers/google/models/{}:predict", self.model)
    }
}

impl EmbeddingProvider for VertexEmbeddingModel {
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()), level = "debug")]
    async fn embed_batch(
        &self,
        texts: &[String],
        task_type: Option<&str>,
    ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        let request = PredictRequest::new(texts, task_type);
        debug!("Generating embeddings from model {}", self.model);
        let response: PredictResponse = self.http_client.post(&self.predict_path(), &request).await?;
        Ok(response.into_vectors())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const PREDICT_PATH: &str = "/v1/projects/test-project/locations/us-central1/publishers/google/models/text-embedding-004:predict";

    fn model_for(server: &Server) -> VertexEmbeddingModel {
        let config = VertexConfig {
            project_id: Some("test-project".to_string()),
            ..VertexConfig::default()
        };
        let mut http_client = HttpClient::new(&config, "test-token".to_string()).unwrap();
        http_client.set_base_url(server.url());
        VertexEmbeddingModel::with_http_client(http_client, config.model, 5)
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", PREDICT_PATH)
            .match_body(Matcher::Json(serde_json::json!({
                "instances": [
                    {"content": "alpha", "task_type": "RETRIEVAL_DOCUMENT"},
                    {"content": "beta", "task_type": "RETRIEVAL_DOCUMENT"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"predictions": [
                    {"embeddings": {"values": [1.0, 0.0]}},
                    {"embeddings": {"values": [0.0, 1.0]}}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let model = model_for(&server);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let vectors = model
            .embed_batch(&texts, Some("RETRIEVAL_DOCUMENT"))
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(model.model_name(), "text-embedding-004");
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_connect_without_project_fails() {
        let result = VertexEmbeddingModel::connect(VertexConfig {
            access_token: Some("token".to_string()),
            ..VertexConfig::default()
        })
        .await;
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_session_connects_once() {
        let session = VertexEmbeddingModel::session(VertexConfig {
            project_id: Some("test-project".to_string()),
            access_token: Some("token".to_string()),
            ..VertexConfig::default()
        });
        assert!(!session.is_initialized());

        let model = session.get_or_init("cid").await.unwrap();
        assert_eq!(model.model_name(), "text-embedding-004");
        session.get_or_init("cid").await.unwrap();
        assert_eq!(session.initializations(), 1);
    }

    #[tokio::test]
    async fn test_quota_error_surfaces_as_api_error() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", PREDICT_PATH)
            .with_status(429)
            .with_body(r#"{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let model = model_for(&server);
        let result = model.embed_batch(&["x".to_string()], None).await;
        match result {
            Err(e @ ProviderError::Api { status_code: 429, .. }) => assert!(e.is_retryable()),
            other => panic!("unexpected result: {other:?}"),
        }
        mock_server.assert_async().await;
    }
}
