//! # authchat_core
//!
//! Core domain logic for authchat: the session token codec, identity
//! provider boundary types, the downstream inference client and the chat
//! transcript state machine.

pub mod auth;
#[cfg(feature = "server")]
pub mod inference;
pub mod models;
pub mod transcript;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
