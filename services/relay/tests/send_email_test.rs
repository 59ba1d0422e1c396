//! Tests for the POST /api/send-email route.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use relay_lib::{
    error::MailError,
    mailer::{build_message, Mailer, OutgoingEmail},
    web::build_router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Mailer that records messages instead of delivering them. It still builds the
/// message so bad addresses fail the same way they would over SMTP.
#[derive(Default, Clone)]
struct MockMailer {
    sent: Arc<RwLock<Vec<OutgoingEmail>>>,
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        build_message("school@example.com", email)?;
        self.sent.write().unwrap().push(email.clone());
        Ok(())
    }
}

async fn post_email(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/send-email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Test: a well-formed message is handed to the mailer and acknowledged
#[tokio::test]
async fn test_send_email_succeeds() {
    let mailer = MockMailer::default();
    let app = build_router(Arc::new(mailer.clone()));

    let (status, body) = post_email(
        app,
        json!({
            "to": "tutor@example.com",
            "subject": "New comment on Blues Guitar",
            "text": "student@example.com wrote: hi",
            "html": "<p>hi</p>"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Email sent successfully" }));
    let sent = mailer.sent.read().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "tutor@example.com");
}

/// Test: a delivery failure is reported as 500 with the error text
#[tokio::test]
async fn test_send_email_failure_returns_500() {
    let mailer = MockMailer::default();
    let app = build_router(Arc::new(mailer.clone()));

    let (status, body) = post_email(
        app,
        json!({
            "to": "nobody",
            "subject": "New comment on Blues Guitar",
            "text": "hi",
            "html": "<p>hi</p>"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("nobody"));
    assert!(mailer.sent.read().unwrap().is_empty());
}

/// Test: a body missing a field still gets the JSON failure reply, not a 422
#[tokio::test]
async fn test_malformed_body_returns_500_json() {
    let mailer = MockMailer::default();
    let app = build_router(Arc::new(mailer.clone()));

    let (status, body) = post_email(
        app,
        json!({ "subject": "s", "text": "t", "html": "h" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("to"));
    assert!(mailer.sent.read().unwrap().is_empty());
}

/// Test: a body that is not JSON at all is answered the same way
#[tokio::test]
async fn test_non_json_body_returns_500_json() {
    let app = build_router(Arc::new(MockMailer::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/send-email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("to=tutor@example.com"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}
