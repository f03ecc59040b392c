//! Authentication domain models.
//!
//! `ProviderGrant` and `ProviderProfile` are the typed shapes of what the
//! identity provider sends back; `Token` is what we sign into the session
//! cookie; `Session` is the read-only view handlers get to see.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Authorization level carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Raw response from the provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderGrant {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: Option<i64>,
    pub id_token: Option<String>,
    pub scope: Option<String>,
}

/// Account grant with an absolute expiry, ready to be copied into a `Token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at: Option<i64>,
}

impl AccountGrant {
    /// Anchor the relative `expires_in` at `now` (unix seconds).
    pub fn from_provider(grant: ProviderGrant, now: i64) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_in.map(|secs| now.saturating_add(secs)),
        }
    }
}

/// OpenID Connect userinfo response.
///
/// Standard claims are typed; anything else (namespaced custom claims such
/// as the role array) lands in `claims`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderProfile {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    #[serde(flatten)]
    pub claims: HashMap<String, serde_json::Value>,
}

impl ProviderProfile {
    /// String entries of the array claim at `uri`.
    ///
    /// Returns an empty list when the claim is missing or is not an array.
    /// Non-string entries are skipped.
    pub fn roles(&self, uri: &str) -> Vec<String> {
        match self.claims.get(uri) {
            Some(serde_json::Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Session token payload. Signed into the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token expiry (unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Outcome of checking a decoded token against the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Active(Token),
    /// The access token's `expires_at` has passed; the session must restart.
    Expired,
}

impl TokenState {
    /// The token, if the session is still usable.
    pub fn active(self) -> Option<Token> {
        match self {
            TokenState::Active(token) => Some(token),
            TokenState::Expired => None,
        }
    }
}

/// Principal details exposed on a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Read-only projection of a `Token` handed to request handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.role == Some(Role::Admin)
    }
}

impl From<&Token> for Session {
    fn from(token: &Token) -> Self {
        Self {
            access_token: Some(token.access_token.clone()).filter(|t| !t.is_empty()),
            expires_at: token.expires_at,
            user: SessionUser {
                name: token.name.clone(),
                email: token.email.clone(),
                image: token.picture.clone(),
                role: token.role,
            },
        }
    }
}
