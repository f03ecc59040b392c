//! Client for the downstream inference service.
//!
//! One `POST {base}/chat` per call. No retries, no queueing: failures are
//! classified so the HTTP layer can relay them.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info};

use crate::models::chat::{InferenceReply, InferenceRequest};

/// Upper bound on a single downstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Downstream call failures.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Connection refused or host unreachable.
    #[error("Inference service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status.
    #[error("Inference service returned {status}")]
    Status {
        status: StatusCode,
        detail: serde_json::Value,
    },

    /// Timeouts, malformed bodies and anything else.
    #[error("{0}")]
    Other(String),
}

/// Connection settings for the inference service.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Skip TLS certificate verification. Development only.
    pub danger_accept_invalid_certs: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            danger_accept_invalid_certs: false,
        }
    }
}

/// Stateless handle to the inference service; cheap to clone.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    chat_url: String,
}

impl InferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if config.danger_accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled for the inference service");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|e| InferenceError::Other(format!("http client build: {e}")))?;
        Ok(Self {
            http,
            chat_url: format!("{}/chat", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Send one chat message and return the service's `response` text.
    pub async fn chat(
        &self,
        request: &InferenceRequest,
        bearer: Option<&str>,
    ) -> Result<String, InferenceError> {
        info!(
            url = %self.chat_url,
            message_len = request.message.len(),
            user_email = request.user_email.as_deref().unwrap_or(""),
            "sending chat request to inference service"
        );

        let mut req = self.http.post(&self.chat_url).json(request);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| {
            error!(url = %self.chat_url, "inference request failed: {e}");
            if e.is_connect() {
                InferenceError::Unreachable(e.to_string())
            } else {
                InferenceError::Other(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            if status == StatusCode::UNPROCESSABLE_ENTITY {
                error!(url = %self.chat_url, %detail, "inference service rejected the payload");
            } else {
                error!(url = %self.chat_url, %status, %detail, "inference service returned an error");
            }
            return Err(InferenceError::Status { status, detail });
        }

        resp.json::<InferenceReply>()
            .await
            .map(|reply| reply.response)
            .map_err(|e| {
                error!(url = %self.chat_url, "malformed inference response: {e}");
                InferenceError::Other(e.to_string())
            })
    }
}

/// Best-effort detail from an error body: its `detail` field, else the
/// whole body, else `"Unknown error"`.
fn error_detail(body: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => {
            let detail = map.get("detail").filter(|d| !is_blank(d)).cloned();
            detail.unwrap_or(serde_json::Value::Object(map))
        }
        Ok(value) if !value.is_null() => value,
        _ if !body.trim().is_empty() => serde_json::Value::String(body.to_string()),
        _ => serde_json::Value::String("Unknown error".into()),
    }
}

/// `null`, `false`, `0` and `""` count as no detail.
fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}
