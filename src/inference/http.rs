//! HTTP client for the move-inference service.

use super::{InferenceError, InferenceErrorKind, MoveInference, MoveRequest, MoveResponse};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Health report from the service root endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` when the service is up.
    pub status: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Service version.
    #[serde(default)]
    pub version: String,
}

/// Raw answer body; every field optional so a bad body maps to `Malformed`.
#[derive(Debug, Deserialize)]
struct WireAnswer {
    #[serde(rename = "move", default)]
    chosen: Option<serde_json::Value>,
    #[serde(default)]
    level: Option<u32>,
    #[serde(default)]
    nodes: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

/// reqwest-backed [`MoveInference`] implementation.
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpInferenceClient {
    /// Creates a client for the service at `base_url` with a per-request deadline.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    #[instrument(skip(base_url), fields(base_url = %base_url.as_ref()))]
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::transport(format!("Failed to build HTTP client: {}", e)))?;

        info!(?timeout, "Creating inference client");
        Ok(Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks that the service is up.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn health(&self) -> Result<HealthStatus, InferenceError> {
        let url = format!("{}/", self.base_url);
        debug!(url = %url, "Sending health check");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Health check failed");
            return Err(InferenceError::new(
                InferenceErrorKind::Service {
                    status: status.as_u16(),
                },
                "Health check failed",
            ));
        }

        let health: HealthStatus = response.json().await?;
        info!(status = %health.status, version = %health.version, "Service healthy");
        Ok(health)
    }

    fn parse_answer(status: reqwest::StatusCode, body: &str) -> Result<MoveResponse, InferenceError> {
        let answer: Option<WireAnswer> = serde_json::from_str(body).ok();

        if !status.is_success() {
            let message = answer
                .and_then(|a| a.error)
                .unwrap_or_else(|| body.trim().to_string());
            error!(status = %status, message = %message, "Inference service error");
            return Err(InferenceError::new(
                InferenceErrorKind::Service {
                    status: status.as_u16(),
                },
                message,
            ));
        }

        let answer = answer.ok_or_else(|| {
            error!(body = %body, "Response body is not a JSON object");
            InferenceError::malformed(format!("Response is not valid JSON: {}", body))
        })?;

        let chosen = answer
            .chosen
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                error!(body = %body, "Response has no usable move field");
                InferenceError::malformed("Response is missing the 'move' field")
            })?;

        Ok(MoveResponse {
            chosen: chosen.to_string(),
            level: answer.level,
            nodes: answer.nodes,
        })
    }
}

#[async_trait::async_trait]
impl MoveInference for HttpInferenceClient {
    #[instrument(skip(self, request), fields(level = request.level, nodes = request.nodes))]
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, InferenceError> {
        let url = format!("{}/get_move", self.base_url);
        debug!(url = %url, fen = %request.position, "Requesting engine move");

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_length = body.len(), "Received response");

        let answer = Self::parse_answer(status, &body)?;
        info!(chosen = %answer.chosen, "Engine move received");
        Ok(answer)
    }
}
