//! Chat proxy: session gate, payload forwarding and the failure taxonomy.

mod common;

use std::time::Duration;

use authchat_core::models::auth::Role;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use common::{
    app, app_with, body_json, config, cookie_header, refused_url, spawn_downstream, token,
};

fn chat_request(cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/chat/send")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn without_session_is_401_and_never_calls_downstream() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"response": "unused"}),
        Duration::ZERO,
    )
    .await;

    let resp = app(&downstream.url)
        .oneshot(chat_request(None, serde_json::json!({"message": "hello"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "unauthorized");
    assert!(downstream.hits().is_empty());
}

#[tokio::test]
async fn expired_session_is_401_and_never_calls_downstream() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"response": "unused"}),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, -10));

    let resp = app(&downstream.url)
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(downstream.hits().is_empty());
}

#[tokio::test]
async fn forwards_message_with_session_email_and_bearer() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"response": "hi there"}),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    let resp = app(&downstream.url)
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        serde_json::json!({"response": "hi there", "success": true})
    );

    let hits = downstream.hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(
        hits[0].body,
        serde_json::json!({"message": "hello", "user_email": "a@b.com"})
    );
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer at-123"));
}

#[tokio::test]
async fn caller_supplied_email_wins() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"response": "ok"}),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    let resp = app(&downstream.url)
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello", "userEmail": "other@b.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(downstream.hits()[0].body["user_email"], "other@b.com");
}

#[tokio::test]
async fn missing_or_empty_message_is_400() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"response": "unused"}),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    for body in [serde_json::json!({}), serde_json::json!({"message": ""})] {
        let resp = app(&downstream.url)
            .oneshot(chat_request(Some(&cookie), body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["message"], "Message is required");
    }
    assert!(downstream.hits().is_empty());
}

#[tokio::test]
async fn connection_refused_is_503() {
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    let resp = app(&refused_url())
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(resp).await;
    assert_eq!(
        json["error"],
        "Cannot reach the chat service. Please try again later."
    );
    assert_eq!(json["details"], "The inference server may not be running.");
}

#[tokio::test]
async fn downstream_error_status_is_relayed_with_detail() {
    let downstream = spawn_downstream(
        StatusCode::BAD_GATEWAY,
        serde_json::json!({"detail": "model crashed"}),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    let resp = app(&downstream.url)
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["details"], "model crashed");
    assert_eq!(downstream.hits().len(), 1);
}

#[tokio::test]
async fn downstream_validation_failure_is_relayed() {
    let detail = serde_json::json!([
        {"loc": ["body", "user_email"], "msg": "field required", "type": "missing"}
    ]);
    let downstream = spawn_downstream(
        StatusCode::UNPROCESSABLE_ENTITY,
        serde_json::json!({ "detail": detail.clone() }),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(None, Role::User, 3600));

    let resp = app(&downstream.url)
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["details"], detail);
    // No email anywhere: the field is omitted rather than sent as null.
    assert!(downstream.hits()[0].body.get("user_email").is_none());
}

#[tokio::test]
async fn timeout_is_500_with_raw_error_text() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"response": "too late"}),
        Duration::from_secs(2),
    )
    .await;
    let mut cfg = config(&downstream.url, "https://tenant.auth0.com");
    cfg.inference.timeout = Duration::from_millis(200);
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    let resp = app_with(cfg)
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "An unexpected error occurred.");
    assert!(json["details"].as_str().is_some_and(|d| !d.is_empty()));
    assert_eq!(downstream.hits().len(), 1);
}

#[tokio::test]
async fn malformed_success_body_is_500() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"unexpected": true}),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    let resp = app(&downstream.url)
        .oneshot(chat_request(
            Some(&cookie),
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_body_is_400_json_without_downstream_call() {
    let downstream = spawn_downstream(
        StatusCode::OK,
        serde_json::json!({"response": "unused"}),
        Duration::ZERO,
    )
    .await;
    let cookie = cookie_header(&token(Some("a@b.com"), Role::User, 3600));

    let wrong_type = chat_request(Some(&cookie), serde_json::json!({"message": 123}));
    let not_json = Request::builder()
        .method("POST")
        .uri("/api/chat/send")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from("not json"))
        .unwrap();
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/api/chat/send")
        .header(header::COOKIE, &cookie)
        .body(Body::from(r#"{"message":"hello"}"#))
        .unwrap();

    for req in [wrong_type, not_json, no_content_type] {
        let resp = app(&downstream.url).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].is_string());
    }
    assert!(downstream.hits().is_empty());
}
