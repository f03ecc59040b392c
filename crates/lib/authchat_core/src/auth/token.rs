//! Token construction from a provider callback and the expiry check run on
//! every decode.

use tracing::warn;

use crate::models::auth::{AccountGrant, ProviderProfile, Role, Token, TokenState};

/// Claim URI under which the provider publishes the role array.
pub const DEFAULT_ROLES_CLAIM: &str = "https://sample-app.com/roles";

/// `Admin` only when the role array contains exactly `"admin"`.
pub fn derive_role(roles: &[String]) -> Role {
    if roles.iter().any(|r| r == "admin") {
        Role::Admin
    } else {
        Role::User
    }
}

impl Token {
    /// Build a fresh token from a completed authorization-code exchange.
    ///
    /// Credentials are copied verbatim from the grant. The role is derived
    /// from the profile only; nothing from an earlier token carries over.
    pub fn from_callback(
        grant: AccountGrant,
        profile: &ProviderProfile,
        roles_claim: &str,
    ) -> Self {
        Self {
            sub: Some(profile.sub.clone()),
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
            name: profile.name.clone(),
            email: profile.email.clone(),
            picture: profile.picture.clone(),
            role: Some(derive_role(&profile.roles(roles_claim))),
        }
    }

    /// Whether the access token expired strictly before `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }

    /// Degrade to `Expired` once the access token is past its expiry.
    ///
    /// No refresh-token exchange is attempted.
    pub fn check_expiry(self, now: i64) -> TokenState {
        if self.is_expired(now) {
            warn!(
                expires_at = self.expires_at,
                now, "access token has expired; session must restart"
            );
            return TokenState::Expired;
        }
        TokenState::Active(self)
    }
}
