//! # authchat_api
//!
//! HTTP surface for authchat: sign-in/sign-out routes, the chat proxy
//! endpoint and the server-rendered pages.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use authchat_core::auth::oauth::SignInStateStore;
use authchat_core::inference::{InferenceClient, InferenceError};
use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, chat, pages};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Downstream inference service.
    pub inference: InferenceClient,
    /// HTTP client for identity provider calls.
    pub http: reqwest::Client,
    /// Sign-ins waiting for their provider callback.
    pub sign_ins: Arc<SignInStateStore>,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Result<Self, InferenceError> {
        let inference = InferenceClient::new(&config.inference)?;
        Ok(Self {
            config,
            inference,
            http: reqwest::Client::new(),
            sign_ins: Arc::new(SignInStateStore::new()),
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no session required)
    let public = Router::new()
        .route(routes::HOME, get(pages::home_page))
        .route(routes::LOGIN, get(pages::login_page))
        .route(routes::TEST, get(pages::test_page))
        .route(routes::AUTH_SIGNIN, get(auth::signin_handler))
        .route(routes::AUTH_CALLBACK, get(auth::callback_handler))
        .route(routes::AUTH_SIGNOUT, post(auth::signout_handler))
        .route(routes::AUTH_SESSION, get(auth::session_handler))
        .route(routes::AUTH_PROVIDERS, get(auth::providers_handler));

    // Protected API routes: 401 without a session
    let protected_api = Router::new()
        .route(routes::CHAT_SEND, post(chat::chat_send_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    // Protected pages: redirect to the login page without a session
    let protected_pages = Router::new()
        .route(routes::DASHBOARD, get(pages::dashboard_page))
        .route(routes::CHAT, get(pages::chat_page))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_page_session,
        ));

    let mut app = Router::new()
        .merge(public)
        .merge(protected_api)
        .merge(protected_pages);

    if let Some(dir) = &state.config.static_dir {
        app = app.nest_service(routes::STATIC, ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
