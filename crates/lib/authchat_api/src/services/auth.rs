//! Sign-in service — the two halves of the authorization-code flow.

use std::time::Instant;

use authchat_core::auth::jwt::{SESSION_MAX_AGE_SECS, encode_session_token};
use authchat_core::auth::oauth::{
    PendingSignIn, compute_code_challenge, exchange_authorization_code, fetch_profile,
    generate_code_verifier, generate_state,
};
use authchat_core::models::auth::{AccountGrant, Role, Token, TokenState};
use chrono::Utc;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::routes;

/// Result of a completed provider callback.
#[derive(Debug)]
pub enum SignInOutcome {
    /// Session token signed; set it as the cookie and go to `callback_url`.
    Established {
        session_jwt: String,
        callback_url: String,
    },
    /// The provider handed out an access token that is already expired.
    Expired,
}

/// Only same-site relative paths are accepted as post-login destinations.
pub fn safe_callback_url(requested: Option<&str>) -> String {
    match requested {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => {
            url.to_string()
        }
        _ => routes::DASHBOARD.to_string(),
    }
}

/// Register a pending sign-in and return the provider authorization URL.
pub fn begin_sign_in(state: &AppState, callback_url: Option<&str>) -> AppResult<String> {
    if !state.config.provider_configured() {
        return Err(AppError::Internal(
            "identity provider is not configured".into(),
        ));
    }

    let verifier = generate_code_verifier();
    let challenge = compute_code_challenge(&verifier);
    let state_key = generate_state();
    let url = state.config.provider().authorize_url(&state_key, &challenge)?;

    state.sign_ins.insert(
        state_key,
        PendingSignIn {
            pkce_verifier: verifier,
            callback_url: safe_callback_url(callback_url),
            created_at: Instant::now(),
        },
    );
    Ok(url)
}

/// Exchange the authorization code, fetch the profile and sign a session.
pub async fn complete_sign_in(
    state: &AppState,
    code: &str,
    pending: PendingSignIn,
) -> AppResult<SignInOutcome> {
    let provider = state.config.provider();
    let grant = exchange_authorization_code(&state.http, &provider, code, &pending.pkce_verifier)
        .await?;
    let profile = fetch_profile(&state.http, &provider, &grant.access_token).await?;

    let now = Utc::now().timestamp();
    let account = AccountGrant::from_provider(grant, now);
    let token = Token::from_callback(account, &profile, &state.config.roles_claim);

    let token = match token.check_expiry(now) {
        TokenState::Active(token) => token,
        TokenState::Expired => {
            warn!(sub = %profile.sub, "provider issued an already-expired access token");
            return Ok(SignInOutcome::Expired);
        }
    };

    let session_jwt = encode_session_token(
        &token,
        state.config.session_secret.as_bytes(),
        SESSION_MAX_AGE_SECS,
    )?;
    info!(
        sub = %profile.sub,
        admin = token.role == Some(Role::Admin),
        "session established"
    );

    Ok(SignInOutcome::Established {
        session_jwt,
        callback_url: pending.callback_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_allowed() {
        assert_eq!(safe_callback_url(Some("/chat")), "/chat");
        assert_eq!(safe_callback_url(Some("/dashboard?tab=1")), "/dashboard?tab=1");
    }

    #[test]
    fn absolute_and_protocol_relative_rejected() {
        assert_eq!(safe_callback_url(Some("https://evil.example")), "/dashboard");
        assert_eq!(safe_callback_url(Some("//evil.example")), "/dashboard");
        assert_eq!(safe_callback_url(Some("/\\evil.example")), "/dashboard");
        assert_eq!(safe_callback_url(None), "/dashboard");
    }
}
