//! Auth gate — resolves the session cookie before protected handlers run.
//!
//! API routes get a 401, pages get redirected to the login page. Handlers
//! behind the gate receive the resolved `Session` through request
//! extensions instead of reading the cookie themselves.

use std::convert::Infallible;

use authchat_core::auth::jwt::decode_session_token;
use authchat_core::models::auth::Session;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::routes;
use crate::services::cookies::SESSION_COOKIE;

/// Session resolved by the gate, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession(pub Session);

/// Resolve the current session from the cookie jar.
///
/// Missing, unverifiable and expired tokens all yield `None`.
pub fn resolve_session(jar: &CookieJar, secret: &[u8]) -> Option<Session> {
    let raw = jar.get(SESSION_COOKIE)?.value();
    match decode_session_token(raw, secret, Utc::now().timestamp()) {
        Ok(state) => state.active().map(|token| Session::from(&token)),
        Err(e) => {
            debug!("ignoring session cookie: {e}");
            None
        }
    }
}

/// Axum middleware for API routes: 401 unless a session resolves.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = resolve_session(&jar, state.config.session_secret.as_bytes())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    request.extensions_mut().insert(AuthenticatedSession(session));

    Ok(next.run(request).await)
}

/// Axum middleware for pages: redirect to the login page unless a session
/// resolves.
pub async fn require_page_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_session(&jar, state.config.session_secret.as_bytes()) {
        Some(session) => {
            request.extensions_mut().insert(AuthenticatedSession(session));
            next.run(request).await
        }
        None => Redirect::to(routes::LOGIN).into_response(),
    }
}

/// Extractor for public routes that render differently when signed in.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(MaybeSession(resolve_session(
            &jar,
            state.config.session_secret.as_bytes(),
        )))
    }
}
