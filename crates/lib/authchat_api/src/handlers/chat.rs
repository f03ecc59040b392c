//! Chat proxy handler — forwards one message to the inference service.

use authchat_core::models::chat::InferenceRequest;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedSession;
use crate::models::{ChatSendRequest, ChatSendResponse};

/// `POST /api/chat/send`: relay a message with the caller's bearer token.
pub async fn chat_send_handler(
    State(state): State<AppState>,
    axum::Extension(AuthenticatedSession(session)): axum::Extension<AuthenticatedSession>,
    body: Result<Json<ChatSendRequest>, JsonRejection>,
) -> AppResult<Json<ChatSendResponse>> {
    let Json(body) = body?;
    let message = body
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::Validation("Message is required".into()))?;

    let request = InferenceRequest {
        message,
        user_email: body
            .user_email
            .filter(|e| !e.is_empty())
            .or(session.user.email),
    };

    let response = state
        .inference
        .chat(&request, session.access_token.as_deref())
        .await?;

    Ok(Json(ChatSendResponse {
        response,
        success: true,
    }))
}
