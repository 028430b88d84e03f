//! HTTP client for Vertex AI
//!
//! Handles endpoint construction, bearer authentication and mapping of
//! non-success responses to `ProviderError`. Retrying and rate limiting are
//! done one level up, so each `post` is exactly one physical call.

use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use super::config::VertexConfig;
use crate::error::{Error, Result};
use crate::model::ProviderError;

/// API version used for all Vertex AI requests
const API_VERSION: &str = "v1";

/// HTTP client bound to one project and region
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// Project ID for Vertex AI
    project_id: String,

    /// Location for Vertex AI
    location: String,

    /// OAuth access token
    access_token: String,
}

#[cfg(test)]
impl HttpClient {
    /// Set the base URL (for testing only)
    pub fn set_base_url(&mut self, url: String) {
        self.base_url = url;
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client for the project and region in `config`
    pub fn new(config: &VertexConfig, access_token: String) -> Result<Self> {
        let project_id = config.project().ok_or_else(|| {
            Error::Configuration("VERTEX_PROJECT_ID is not configured for Vertex AI embeddings".to_string())
        })?;

        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!("https://{}-aiplatform.googleapis.com", config.location),
            project_id: project_id.to_string(),
            location: config.location.clone(),
            access_token,
        })
    }

    /// Build a URL for a path under the project and location
    fn build_vertex_url(&self, path: &str) -> std::result::Result<Url, ProviderError> {
        let url = format!(
            "{}/{}/projects/{}/locations/{}/{}",
            self.base_url, API_VERSION, self.project_id, self.location, path
        );
        Url::parse(&url).map_err(|e| ProviderError::InvalidRequest(format!("Invalid URL: {}", e)))
    }

    /// Send a POST request with a JSON body
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, ProviderError> {
        let url = self.build_vertex_url(path)?;

        debug!("Sending POST request to {}", path);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                ProviderError::UnexpectedResponse(format!("Failed to parse response: {}", e))
            });
        }

        error!("API error: {} - {}", status, response_text);
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ProviderError::Auth(format!(
                "Invalid or expired credentials ({})",
                status.as_u16()
            )))
        } else {
            Err(ProviderError::Api {
                status_code: status.as_u16(),
                message: response_text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestResponse {
        message: String,
    }

    fn config() -> VertexConfig {
        VertexConfig {
            project_id: Some("test-project".to_string()),
            ..VertexConfig::default()
        }
    }

    async fn client(server: &Server) -> HttpClient {
        let mut client = HttpClient::new(&config(), "test-token".to_string()).unwrap();
        client.set_base_url(server.url());
        client
    }

    #[test]
    fn test_missing_project_is_configuration_error() {
        let result = HttpClient::new(&VertexConfig::default(), "token".to_string());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_vertex_url() {
        let client = HttpClient::new(&config(), "token".to_string()).unwrap();
        let url = client
            .build_vertex_url("publishers/google/models/text-embedding-004:predict")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/test-project/locations/us-central1/publishers/google/models/text-embedding-004:predict"
        );
    }

    #[tokio::test]
    async fn test_post_request_success() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/projects/test-project/locations/us-central1/test")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"message\": \"success\"}")
            .expect(1)
            .create_async()
            .await;

        let client = client(&server).await;
        let body = serde_json::json!({"test": "data"});
        let response: TestResponse = client.post("test", &body).await.unwrap();
        assert_eq!(response.message, "success");

        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let mut server = Server::new_async().await;
        let unavailable = server
            .mock("POST", "/v1/projects/test-project/locations/us-central1/busy")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;
        let unauthorized = server
            .mock("POST", "/v1/projects/test-project/locations/us-central1/secret")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client = client(&server).await;
        let body = serde_json::json!({});

        let result: std::result::Result<TestResponse, _> = client.post("busy", &body).await;
        assert!(matches!(
            result,
            Err(ProviderError::Api {
                status_code: 503,
                ..
            })
        ));

        let result: std::result::Result<TestResponse, _> = client.post("secret", &body).await;
        assert!(matches!(result, Err(ProviderError::Auth(_))));

        unavailable.assert_async().await;
        unauthorized.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/projects/test-project/locations/us-central1/test")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client(&server).await;
        let result: std::result::Result<TestResponse, _> =
            client.post("test", &serde_json::json!({})).await;
        assert!(matches!(result, Err(ProviderError::UnexpectedResponse(_))));

        mock_server.assert_async().await;
    }
}
