//! OpenID Connect relying-party support.
//!
//! Authorization-code flow with PKCE against an Auth0-style issuer:
//! building the authorize URL, keeping pending sign-ins between redirect
//! and callback, exchanging the code and fetching the userinfo profile.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::AuthError;
use crate::models::auth::{ProviderGrant, ProviderProfile};

/// TTL for pending sign-in entries (10 minutes).
const STATE_TTL: Duration = Duration::from_secs(600);

/// Scopes requested at sign-in.
pub const DEFAULT_SCOPE: &str = "openid email profile";

// =============================================================================
// Provider endpoints
// =============================================================================

/// Static relying-party registration for one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Issuer base URL, e.g. `https://tenant.auth0.com`.
    pub issuer: String,
    pub client_id: String,
    pub client_secret: String,
    /// Absolute callback URL registered with the provider.
    pub redirect_uri: String,
    pub scope: String,
}

impl ProviderConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.issuer.trim_end_matches('/'), path)
    }

    pub fn authorize_endpoint(&self) -> String {
        self.endpoint("authorize")
    }

    pub fn token_endpoint(&self) -> String {
        self.endpoint("oauth/token")
    }

    pub fn userinfo_endpoint(&self) -> String {
        self.endpoint("userinfo")
    }

    /// Authorization URL for a new sign-in attempt.
    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<String, AuthError> {
        let url = url::Url::parse_with_params(
            &self.authorize_endpoint(),
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
                ("state", state),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
            ],
        )
        .map_err(|e| AuthError::ValidationError(format!("invalid issuer URL: {e}")))?;
        Ok(url.into())
    }
}

// =============================================================================
// PKCE helpers
// =============================================================================

/// Generate a cryptographic PKCE code verifier (43–128 chars, URL-safe).
pub fn generate_code_verifier() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute S256 code challenge from a code verifier.
pub fn compute_code_challenge(verifier: &str) -> String {
    use base64::Engine;

    let digest = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}

/// Generate a cryptographic state parameter (CSRF token).
pub fn generate_state() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Pending sign-in store
// =============================================================================

/// Sign-in attempt stored between the authorize redirect and the callback.
pub struct PendingSignIn {
    pub pkce_verifier: String,
    /// Where to send the browser once the session is established.
    pub callback_url: String,
    pub created_at: Instant,
}

/// In-memory store for pending sign-ins, keyed by the `state` parameter.
pub struct SignInStateStore {
    states: DashMap<String, PendingSignIn>,
}

impl SignInStateStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    pub fn insert(&self, state_key: String, pending: PendingSignIn) {
        self.states.insert(state_key, pending);
    }

    /// Take (remove and return) a pending entry.
    /// Returns `None` if not found or expired.
    pub fn take(&self, state_key: &str) -> Option<PendingSignIn> {
        let (_, pending) = self.states.remove(state_key)?;
        if pending.created_at.elapsed() > STATE_TTL {
            return None;
        }
        Some(pending)
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        self.states.retain(|_, v| v.created_at.elapsed() <= STATE_TTL);
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &std::sync::Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}

impl Default for SignInStateStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Code exchange & profile
// =============================================================================

/// Exchange an authorization code for the provider's token grant.
pub async fn exchange_authorization_code(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    code: &str,
    code_verifier: &str,
) -> Result<ProviderGrant, AuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", provider.client_id.as_str()),
        ("client_secret", provider.client_secret.as_str()),
        ("redirect_uri", provider.redirect_uri.as_str()),
        ("code_verifier", code_verifier),
    ];

    let resp = client
        .post(provider.token_endpoint())
        .form(&params)
        .send()
        .await
        .map_err(|e| AuthError::ProviderError(format!("Token exchange failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::ProviderError(format!(
            "Token exchange HTTP {status}: {body}"
        )));
    }

    resp.json::<ProviderGrant>()
        .await
        .map_err(|e| AuthError::ProviderError(format!("Token response parse error: {e}")))
}

/// Fetch the signed-in principal's profile, including custom claims.
pub async fn fetch_profile(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    access_token: &str,
) -> Result<ProviderProfile, AuthError> {
    let resp = client
        .get(provider.userinfo_endpoint())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AuthError::ProviderError(format!("Userinfo request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::ProviderError(format!(
            "Userinfo HTTP {status}: {body}"
        )));
    }

    let profile = resp
        .json::<ProviderProfile>()
        .await
        .map_err(|e| AuthError::ProviderError(format!("Userinfo parse error: {e}")))?;
    debug!(sub = %profile.sub, "fetched provider profile");
    Ok(profile)
}
