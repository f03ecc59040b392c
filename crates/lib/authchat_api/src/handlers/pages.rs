//! Server-rendered pages.
//!
//! Plain markup only. The chat page loads the `authchat_wasm` bundle from
//! `/static` and keeps its transcript in browser memory.

use authchat_core::models::auth::Session;
use axum::Extension;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Deserialize;

use crate::AppState;
use crate::middleware::auth::{AuthenticatedSession, MaybeSession};
use crate::routes;

/// Browser side of the chat page. Drives the wasm `ChatTranscript`.
const CHAT_SCRIPT: &str = r#"
import init, { ChatTranscript } from "/static/authchat_wasm.js";

await init();
const transcript = new ChatTranscript();
const root = document.getElementById("chat");
const list = document.getElementById("messages");
const input = document.getElementById("input");
const send = document.getElementById("send");
const pending = document.getElementById("pending");

function render() {
  list.replaceChildren();
  for (const m of JSON.parse(transcript.messagesJson())) {
    const li = document.createElement("li");
    li.className = m.sender;
    li.textContent = m.content;
    const time = document.createElement("small");
    time.textContent = " " + new Date(m.timestamp).toLocaleTimeString();
    li.appendChild(time);
    list.appendChild(li);
  }
  const busy = transcript.isPending();
  pending.hidden = !busy;
  send.disabled = busy || input.value.trim() === "";
  input.disabled = busy;
}

async function submit() {
  const message = transcript.beginSubmit(input.value, Date.now());
  if (message === undefined) return;
  input.value = "";
  render();
  try {
    const resp = await fetch("/api/chat/send", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ message, userEmail: root.dataset.email || undefined }),
    });
    if (!resp.ok) throw new Error("HTTP " + resp.status);
    const data = await resp.json();
    transcript.completeOk(data.response, Date.now());
  } catch (err) {
    console.error("chat send failed", err);
    transcript.completeErr(Date.now());
  }
  render();
}

send.addEventListener("click", submit);
input.addEventListener("input", render);
input.addEventListener("keydown", (e) => {
  if (e.key === "Enter" && !e.shiftKey) {
    e.preventDefault();
    submit();
  }
});
render();
"#;

fn layout(title: &str, body: Markup) -> Html<String> {
    let page = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · authchat" }
            }
            body { (body) }
        }
    };
    Html(page.into_string())
}

fn nav(session: Option<&Session>) -> Markup {
    html! {
        nav {
            a href=(routes::HOME) { "authchat" }
            " "
            @if session.is_some() {
                a href=(routes::CHAT) { "Chat" }
                " "
                a href=(routes::DASHBOARD) { "Dashboard" }
            } @else {
                a href=(routes::LOGIN) { "Log in" }
            }
        }
    }
}

fn signout_form() -> Markup {
    html! {
        form method="post" action=(routes::AUTH_SIGNOUT) {
            button type="submit" { "Log out" }
        }
    }
}

/// `GET /`: public landing page.
pub async fn home_page(MaybeSession(session): MaybeSession) -> Html<String> {
    layout(
        "Home",
        html! {
            (nav(session.as_ref()))
            main {
                h1 { "authchat" }
                p { "This page is public; no sign-in required." }
                @match &session {
                    Some(s) => {
                        p { "Signed in as " (s.user.email.as_deref().unwrap_or("unknown")) }
                        a href=(routes::DASHBOARD) { "Go to dashboard" }
                    }
                    None => {
                        p { "Not signed in." }
                        a href=(routes::LOGIN) { "Go to login" }
                    }
                }
            }
        },
    )
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub error: Option<String>,
}

/// `GET /login`: sign-in entry point; signed-in visitors go to the dashboard.
pub async fn login_page(
    MaybeSession(session): MaybeSession,
    Query(params): Query<LoginParams>,
) -> Response {
    if session.is_some() {
        return Redirect::to(routes::DASHBOARD).into_response();
    }
    let signin = format!("{}?callbackUrl={}", routes::AUTH_SIGNIN, routes::DASHBOARD);
    layout(
        "Log in",
        html! {
            main {
                a href=(routes::HOME) { "Back to home" }
                h1 { "Log in" }
                @if let Some(error) = &params.error {
                    p role="alert" { "Sign-in failed: " (error) }
                }
                a href=(signin) { "Sign in with Auth0" }
            }
        },
    )
    .into_response()
}

/// `GET /dashboard`: protected page showing the session's user.
pub async fn dashboard_page(
    Extension(AuthenticatedSession(session)): Extension<AuthenticatedSession>,
) -> Html<String> {
    let user = &session.user;
    let greeting = user
        .name
        .as_deref()
        .or(user.email.as_deref())
        .unwrap_or("there");
    layout(
        "Dashboard",
        html! {
            (nav(Some(&session)))
            header {
                span { "Hello, " (greeting) }
                @if session.is_admin() {
                    " "
                    a href=(routes::ADMIN) { "Admin page" }
                }
                (signout_form())
            }
            main {
                h1 { "Dashboard" }
                p { "Only signed-in users can see this page." }
                dl {
                    dt { "Name" } dd { (user.name.as_deref().unwrap_or("N/A")) }
                    dt { "Email" } dd { (user.email.as_deref().unwrap_or("N/A")) }
                    dt { "Image" }
                    dd {
                        @if let Some(image) = &user.image {
                            img src=(image) alt="User" width="32" height="32";
                        }
                    }
                }
            }
        },
    )
}

/// `GET /chat`: protected chat page.
pub async fn chat_page(
    Extension(AuthenticatedSession(session)): Extension<AuthenticatedSession>,
) -> Html<String> {
    let email = session.user.email.clone().unwrap_or_default();
    layout(
        "Chat",
        html! {
            (nav(Some(&session)))
            main #chat data-email=(email) {
                h1 { "Chat" }
                p { "Signed in as " (email) }
                ol #messages {}
                p #pending hidden { "Waiting for a reply…" }
                textarea #input rows="2" placeholder="Type a message…" {}
                button #send type="button" disabled { "Send" }
            }
            script type="module" { (PreEscaped(CHAT_SCRIPT)) }
        },
    )
}

/// `GET /test`: diagnostic page listing provider settings (never secrets).
pub async fn test_page(State(state): State<AppState>) -> Html<String> {
    let config = &state.config;
    let set_or_missing = |value: &str| {
        if value.is_empty() {
            "Not set".to_string()
        } else {
            value.to_string()
        }
    };
    layout(
        "Diagnostics",
        html! {
            main {
                h1 { "Auth diagnostics" }
                h2 { "Providers" }
                ul {
                    li { "auth0: callback " code { (config.redirect_uri()) } }
                }
                h2 { "Configuration" }
                dl {
                    dt { "AUTH0_CLIENT_ID" } dd { (set_or_missing(&config.auth0_client_id)) }
                    dt { "AUTH0_ISSUER" } dd { (set_or_missing(&config.auth0_issuer)) }
                    dt { "PUBLIC_URL" } dd { (set_or_missing(&config.public_url)) }
                    dt { "FASTAPI_URL" } dd { (config.inference.base_url) }
                    dt { "Downstream TLS verification" }
                    dd {
                        @if config.inference.danger_accept_invalid_certs { "DISABLED (development only)" }
                        @else { "enabled" }
                    }
                }
                a href=(routes::AUTH_PROVIDERS) { "Check " (routes::AUTH_PROVIDERS) }
                br;
                a href=(routes::AUTH_SIGNIN) { "Check " (routes::AUTH_SIGNIN) }
            }
        },
    )
}
