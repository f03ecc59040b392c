//! Session token signing and verification.
//!
//! The session cookie holds a HS256 JWT whose payload is the `Token` plus
//! `iat`/`exp`. `exp` bounds the cookie's own lifetime; the access token's
//! `expiresAt` is checked separately on every decode.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AuthError;
use crate::models::auth::{Token, TokenState};

/// Session cookie lifetime: 30 days.
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    token: Token,
    iat: i64,
    exp: i64,
}

/// Sign `token` into a session JWT valid for `max_age_secs` from now.
pub fn encode_session_token(
    token: &Token,
    secret: &[u8],
    max_age_secs: i64,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        token: token.clone(),
        iat: now,
        exp: now + max_age_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a session JWT and run the access-token expiry check against `now`.
///
/// Bad signatures, malformed payloads and lapsed cookies are errors; a
/// well-formed token whose access token has expired is `TokenState::Expired`.
pub fn decode_session_token(raw: &str, secret: &[u8], now: i64) -> Result<TokenState, AuthError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<SessionClaims>(raw, &key, &validation)
        .map_err(|e| AuthError::TokenError(format!("jwt decode: {e}")))?;
    Ok(data.claims.token.check_expiry(now))
}

/// Resolve the session signing secret: `SESSION_SECRET` → `NEXTAUTH_SECRET`
/// → a random per-process secret.
pub fn resolve_session_secret() -> String {
    for var in ["SESSION_SECRET", "NEXTAUTH_SECRET"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    warn!("no SESSION_SECRET set; generated an ephemeral one, sessions will not survive a restart");
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
