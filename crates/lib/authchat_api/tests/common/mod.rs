//! Shared fixtures: app construction, session cookies, fake upstreams.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use authchat_api::config::ApiConfig;
use authchat_api::services::cookies::SESSION_COOKIE;
use authchat_api::{AppState, router};
use authchat_core::auth::jwt::{SESSION_MAX_AGE_SECS, encode_session_token};
use authchat_core::auth::token::DEFAULT_ROLES_CLAIM;
use authchat_core::inference::InferenceConfig;
use authchat_core::models::auth::{Role, Token};
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::post;

pub const SECRET: &str = "integration-secret";

pub fn config(fastapi_url: &str, issuer: &str) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        public_url: "http://localhost:3000".into(),
        session_secret: SECRET.into(),
        auth0_client_id: "client-id".into(),
        auth0_client_secret: "client-secret".into(),
        auth0_issuer: issuer.into(),
        roles_claim: DEFAULT_ROLES_CLAIM.into(),
        inference: InferenceConfig {
            base_url: fastapi_url.into(),
            timeout: Duration::from_secs(5),
            danger_accept_invalid_certs: false,
        },
        static_dir: None,
    }
}

pub fn app_with(config: ApiConfig) -> Router {
    router(AppState::new(config).expect("app state"))
}

pub fn app(fastapi_url: &str) -> Router {
    app_with(config(fastapi_url, "https://tenant.auth0.com"))
}

pub fn token(email: Option<&str>, role: Role, expires_in: i64) -> Token {
    Token {
        sub: Some("auth0|integration".into()),
        access_token: "at-123".into(),
        refresh_token: Some("rt-456".into()),
        expires_at: Some(chrono::Utc::now().timestamp() + expires_in),
        name: Some("Ada Lovelace".into()),
        email: email.map(str::to_string),
        picture: None,
        role: Some(role),
    }
}

/// `Cookie` header value carrying a signed session for `token`.
pub fn cookie_header(token: &Token) -> String {
    let jwt = encode_session_token(token, SECRET.as_bytes(), SESSION_MAX_AGE_SECS)
        .expect("encode session");
    format!("{SESSION_COOKIE}={jwt}")
}

pub async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("parse JSON")
}

pub async fn body_text(resp: Response) -> String {
    String::from_utf8(body_bytes(resp).await).expect("utf-8 body")
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// One request received by the fake inference service.
#[derive(Debug, Clone)]
pub struct Captured {
    pub body: serde_json::Value,
    pub authorization: Option<String>,
}

pub struct Downstream {
    pub url: String,
    pub hits: Arc<Mutex<Vec<Captured>>>,
}

impl Downstream {
    pub fn hits(&self) -> Vec<Captured> {
        self.hits.lock().unwrap().clone()
    }
}

/// Fake inference service answering every `POST /chat` with `status`/`reply`
/// after `delay`.
pub async fn spawn_downstream(
    status: StatusCode,
    reply: serde_json::Value,
    delay: Duration,
) -> Downstream {
    let hits: Arc<Mutex<Vec<Captured>>> = Arc::default();
    let recorded = Arc::clone(&hits);
    let app = Router::new().route(
        "/chat",
        post(
            move |headers: HeaderMap, axum::Json(body): axum::Json<serde_json::Value>| {
                let recorded = Arc::clone(&recorded);
                let reply = reply.clone();
                async move {
                    recorded.lock().unwrap().push(Captured {
                        body,
                        authorization: headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                    });
                    tokio::time::sleep(delay).await;
                    (status, axum::Json(reply))
                }
            },
        ),
    );
    Downstream {
        url: serve(app).await,
        hits,
    }
}
