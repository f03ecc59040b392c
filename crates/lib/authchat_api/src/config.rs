//! API server configuration.

use std::path::PathBuf;
use std::time::Duration;

use authchat_core::auth::jwt::resolve_session_secret;
use authchat_core::auth::oauth::{DEFAULT_SCOPE, ProviderConfig};
use authchat_core::auth::token::DEFAULT_ROLES_CLAIM;
use authchat_core::inference::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, InferenceConfig};

use crate::routes;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// Externally visible base URL, used to build the OAuth callback URL.
    pub public_url: String,
    /// Session JWT signing secret.
    pub session_secret: String,
    pub auth0_client_id: String,
    pub auth0_client_secret: String,
    /// Issuer base URL, e.g. `https://tenant.auth0.com`.
    pub auth0_issuer: String,
    /// Claim URI holding the role array.
    pub roles_claim: String,
    /// Downstream inference service.
    pub inference: InferenceConfig,
    /// Directory served under `/static` (the wasm bundle), if any.
    pub static_dir: Option<PathBuf>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                                  | Default                          |
    /// |-------------------------------------------|----------------------------------|
    /// | `BIND_ADDR`                               | `127.0.0.1:3000`                 |
    /// | `PUBLIC_URL` / `NEXTAUTH_URL`             | `http://localhost:3000`          |
    /// | `SESSION_SECRET` / `NEXTAUTH_SECRET`      | generated per process            |
    /// | `AUTH0_CLIENT_ID`, `AUTH0_CLIENT_SECRET`  | empty                            |
    /// | `AUTH0_ISSUER`                            | empty                            |
    /// | `AUTH0_ROLES_CLAIM`                       | `https://sample-app.com/roles`   |
    /// | `FASTAPI_URL`                             | `http://127.0.0.1:8000`          |
    /// | `CHAT_TIMEOUT_SECS`                       | `30`                             |
    /// | `DANGER_ACCEPT_INVALID_DOWNSTREAM_CERTS`  | `false`                          |
    /// | `STATIC_DIR`                              | unset                            |
    pub fn from_env() -> Self {
        let timeout = std::env::var("CHAT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:3000"),
            public_url: std::env::var("PUBLIC_URL")
                .or_else(|_| std::env::var("NEXTAUTH_URL"))
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            session_secret: resolve_session_secret(),
            auth0_client_id: env_or("AUTH0_CLIENT_ID", ""),
            auth0_client_secret: env_or("AUTH0_CLIENT_SECRET", ""),
            auth0_issuer: env_or("AUTH0_ISSUER", ""),
            roles_claim: env_or("AUTH0_ROLES_CLAIM", DEFAULT_ROLES_CLAIM),
            inference: InferenceConfig {
                base_url: env_or("FASTAPI_URL", DEFAULT_BASE_URL),
                timeout,
                danger_accept_invalid_certs: env_flag("DANGER_ACCEPT_INVALID_DOWNSTREAM_CERTS"),
            },
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
        }
    }

    /// Absolute URL the provider redirects back to.
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}{}",
            self.public_url.trim_end_matches('/'),
            routes::AUTH_CALLBACK
        )
    }

    /// Relying-party registration derived from this config.
    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            issuer: self.auth0_issuer.clone(),
            client_id: self.auth0_client_id.clone(),
            client_secret: self.auth0_client_secret.clone(),
            redirect_uri: self.redirect_uri(),
            scope: DEFAULT_SCOPE.into(),
        }
    }

    /// Whether enough provider settings exist to attempt a sign-in.
    pub fn provider_configured(&self) -> bool {
        !self.auth0_client_id.is_empty() && !self.auth0_issuer.is_empty()
    }

    /// Session cookies are `Secure` whenever the app is served over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
