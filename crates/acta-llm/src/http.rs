//! Blocking HTTP client for an Ollama-style `/api/generate` endpoint.
//!
//! One request per completion, no streaming. The per-call deadline is set on
//! the underlying HTTP client at construction time; expiry surfaces as
//! [`EndpointError::Timeout`] so the orchestrator's retry logic can tell a
//! slow endpoint from a broken one.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use acta_contracts::error::{ActaError, ActaResult, EndpointError};
use acta_core::traits::ReasoningClient;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Where and how to reach the reasoning endpoint.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Base URL without the API path, e.g. `http://localhost:11434`.
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// A [`ReasoningClient`] speaking the Ollama generate API.
pub struct HttpReasoningClient {
    config: EndpointConfig,
    client: reqwest::blocking::Client,
}

impl HttpReasoningClient {
    pub fn new(config: EndpointConfig) -> ActaResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ActaError::Config {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }
}

impl ReasoningClient for HttpReasoningClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, EndpointError> {
        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.config.model,
            system,
            prompt,
            stream: false,
        };

        debug!(url = %url, model = %self.config.model, "requesting completion");
        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_timeout() {
                EndpointError::Timeout {
                    seconds: self.config.timeout_seconds,
                }
            } else {
                EndpointError::Transport {
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EndpointError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: GenerateResponse =
            response.json().map_err(|e| EndpointError::MalformedResponse {
                reason: format!("response body is not the expected JSON: {}", e),
            })?;
        Ok(decoded.response)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
