//! Authentication logic.
//!
//! Session token codec, role derivation and the OpenID Connect relying-party
//! helpers shared by the HTTP layer.

#[cfg(feature = "server")]
pub mod jwt;
#[cfg(feature = "server")]
pub mod oauth;
pub mod token;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Identity provider error: {0}")]
    ProviderError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
