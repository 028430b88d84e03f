//! Access tokens for Vertex AI

use tracing::debug;

use super::config::VertexConfig;
use crate::error::{Error, Result};

/// Token from the configuration, or from `gcloud auth print-access-token`
pub async fn resolve_access_token(config: &VertexConfig) -> Result<String> {
    match config.access_token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => {
            debug!("No access token configured, asking gcloud");
            fetch_gcloud_access_token().await
        }
    }
}

async fn fetch_gcloud_access_token() -> Result<String> {
    let output = tokio::process::Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .await
        .map_err(|e| {
            Error::Configuration(format!(
                "VERTEX_ACCESS_TOKEN is not set and gcloud could not be run: {}",
                e
            ))
        })?;

    if !output.status.success() {
        return Err(Error::Configuration(format!(
            "gcloud auth print-access-token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(Error::Configuration(
            "gcloud returned an empty access token".to_string(),
        ));
    }
    Ok(token)
}
