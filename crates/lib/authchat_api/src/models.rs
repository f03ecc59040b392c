//! Request and response bodies of the JSON endpoints.

use serde::{Deserialize, Serialize};

/// Generic error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Error body of the chat proxy.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatErrorResponse {
    pub error: String,
    pub details: serde_json::Value,
}

/// `POST /api/chat/send` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSendRequest {
    pub message: Option<String>,
    pub user_email: Option<String>,
}

/// `POST /api/chat/send` success body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatSendResponse {
    pub response: String,
    pub success: bool,
}

/// One entry of `GET /api/auth/providers`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub signin_url: String,
    pub callback_url: String,
}
