//! Cookie service — set/clear the httpOnly session cookie.

use authchat_core::auth::jwt::SESSION_MAX_AGE_SECS;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie name for the signed session token.
pub const SESSION_COOKIE: &str = "authchat_session";

/// Build a httpOnly cookie carrying the session JWT.
pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
        .build()
}

/// Build an expired cookie to clear the session.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
