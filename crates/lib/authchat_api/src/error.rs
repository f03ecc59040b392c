//! Application error types.

use authchat_core::auth::AuthError;
use authchat_core::inference::InferenceError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::{ChatErrorResponse, ErrorResponse};

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    /// The inference service could not be reached at all.
    #[error("Chat service unavailable: {0}")]
    ChatUnavailable(String),

    /// The inference service answered with an error status.
    #[error("Chat service returned {status}")]
    ChatDownstream {
        status: StatusCode,
        detail: serde_json::Value,
    },

    /// Any other chat failure. The raw error text is returned to the caller.
    #[error("Chat request failed: {0}")]
    ChatUnexpected(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m),
            AppError::Provider(m) => (StatusCode::BAD_GATEWAY, "provider_error", m),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
            AppError::ChatUnavailable(_) => {
                return chat_error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Cannot reach the chat service. Please try again later.",
                    "The inference server may not be running.".into(),
                );
            }
            AppError::ChatDownstream { status, detail } => {
                return chat_error(status, "The chat service reported an error.", detail);
            }
            AppError::ChatUnexpected(m) => {
                return chat_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.",
                    m.into(),
                );
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

fn chat_error(status: StatusCode, error: &str, details: serde_json::Value) -> Response {
    let body = Json(ChatErrorResponse {
        error: error.to_string(),
        details,
    });
    (status, body).into_response()
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TokenError(msg) => AppError::Unauthorized(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::ProviderError(msg) => AppError::Provider(msg),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(_) => "Invalid request body",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body",
            JsonRejection::MissingJsonContentType(_) => {
                "Request must have Content-Type: application/json"
            }
            _ => "Unreadable request body",
        };
        tracing::debug!("rejected JSON body: {}", rejection.body_text());
        AppError::Validation(message.into())
    }
}

impl From<InferenceError> for AppError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::Unreachable(msg) => AppError::ChatUnavailable(msg),
            InferenceError::Status { status, detail } => AppError::ChatDownstream {
                // Same status code, reqwest and axum share the `http` crate.
                status,
                detail,
            },
            InferenceError::Other(msg) => AppError::ChatUnexpected(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unreachable_maps_to_503() {
        let resp = AppError::from(InferenceError::Unreachable("refused".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(resp).await;
        assert!(json["error"].is_string());
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn downstream_status_relayed() {
        let resp = AppError::from(InferenceError::Status {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: serde_json::json!([{"msg": "field required"}]),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(resp).await["details"][0]["msg"], "field required");
    }

    #[tokio::test]
    async fn unexpected_error_surfaces_raw_text() {
        let resp = AppError::from(InferenceError::Other("operation timed out".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["details"], "operation timed out");
    }

    #[tokio::test]
    async fn internal_error_hides_message() {
        let resp = AppError::Internal("secret detail".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["message"], "Internal server error");
    }
}
