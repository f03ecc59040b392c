//! Domain models shared by the API and the browser bindings.

pub mod auth;
pub mod chat;
