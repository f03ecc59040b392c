//! Route paths.

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const DASHBOARD: &str = "/dashboard";
pub const CHAT: &str = "/chat";
pub const TEST: &str = "/test";
pub const ADMIN: &str = "/admin";
pub const STATIC: &str = "/static";

pub const AUTH_SIGNIN: &str = "/api/auth/signin";
pub const AUTH_CALLBACK: &str = "/api/auth/callback/auth0";
pub const AUTH_SIGNOUT: &str = "/api/auth/signout";
pub const AUTH_SESSION: &str = "/api/auth/session";
pub const AUTH_PROVIDERS: &str = "/api/auth/providers";

pub const CHAT_SEND: &str = "/api/chat/send";
