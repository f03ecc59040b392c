//! Authentication request handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::warn;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeSession;
use crate::models::ProviderInfo;
use crate::routes;
use crate::services::auth::{self, SignInOutcome};
use crate::services::cookies::{clear_session_cookie, session_cookie};

/// Query parameters for `GET /api/auth/signin`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInParams {
    pub callback_url: Option<String>,
}

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `GET /api/auth/signin`: start the authorization-code flow.
pub async fn signin_handler(
    State(state): State<AppState>,
    Query(params): Query<SignInParams>,
) -> AppResult<Redirect> {
    let url = auth::begin_sign_in(&state, params.callback_url.as_deref())?;
    Ok(Redirect::to(&url))
}

/// `GET /api/auth/callback/auth0`: finish sign-in and set the session cookie.
pub async fn callback_handler(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    if let Some(error) = params.error {
        warn!(
            %error,
            description = params.error_description.as_deref().unwrap_or(""),
            "provider returned an error to the callback"
        );
        return Ok((jar, login_with_error(&error)));
    }

    let (code, state_key) = match (params.code, params.state) {
        (Some(code), Some(state_key)) => (code, state_key),
        _ => {
            return Err(AppError::Validation(
                "Missing code or state parameter".into(),
            ));
        }
    };

    let pending = state
        .sign_ins
        .take(&state_key)
        .ok_or_else(|| AppError::Validation("Unknown or expired sign-in attempt".into()))?;

    let secure = state.config.secure_cookies();
    match auth::complete_sign_in(&state, &code, pending).await? {
        SignInOutcome::Established {
            session_jwt,
            callback_url,
        } => Ok((
            jar.add(session_cookie(&session_jwt, secure)),
            Redirect::to(&callback_url),
        )),
        SignInOutcome::Expired => Ok((
            jar.add(clear_session_cookie(secure)),
            login_with_error("SessionExpired"),
        )),
    }
}

/// `POST /api/auth/signout`: drop the session cookie.
pub async fn signout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    (
        jar.add(clear_session_cookie(state.config.secure_cookies())),
        Redirect::to(routes::HOME),
    )
}

/// `GET /api/auth/session`: the current session, or `{}`.
pub async fn session_handler(MaybeSession(session): MaybeSession) -> Json<serde_json::Value> {
    match session {
        Some(session) => Json(serde_json::to_value(session).unwrap_or_default()),
        None => Json(serde_json::json!({})),
    }
}

/// `GET /api/auth/providers`: configured sign-in providers.
pub async fn providers_handler(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, ProviderInfo>> {
    let base = state.config.public_url.trim_end_matches('/');
    let mut providers = BTreeMap::new();
    providers.insert(
        "auth0".to_string(),
        ProviderInfo {
            id: "auth0".into(),
            name: "Auth0".into(),
            kind: "oauth".into(),
            signin_url: format!("{base}{}", routes::AUTH_SIGNIN),
            callback_url: state.config.redirect_uri(),
        },
    );
    Json(providers)
}

fn login_with_error(error: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", error)
        .finish();
    Redirect::to(&format!("{}?{query}", routes::LOGIN))
}
