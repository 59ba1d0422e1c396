//! Shared helpers for the API integration tests.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use api_lib::{
    config::Config,
    web::{build_router, AppState},
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use music_school_core::{EmailMessage, EmailRelayService, InMemoryDatabase, RelayError};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Relay stand-in that records every message it is asked to deliver.
#[derive(Default, Clone)]
pub struct RecordingRelay {
    pub sent: Arc<RwLock<Vec<EmailMessage>>>,
}

impl RecordingRelay {
    /// Waits briefly for the detached email task to hand over its message.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<EmailMessage> {
        for _ in 0..100 {
            if self.sent.read().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl EmailRelayService for RecordingRelay {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), RelayError> {
        self.sent.write().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<InMemoryDatabase>,
    pub relay: RecordingRelay,
}

pub fn create_test_app() -> TestApp {
    let db = Arc::new(InMemoryDatabase::new());
    let relay = RecordingRelay::default();
    let config = Arc::new(Config::from_lookup(|_| None).expect("default config"));
    let state = Arc::new(AppState::new(db.clone(), Arc::new(relay.clone()), config));
    TestApp {
        router: build_router(state),
        db,
        relay,
    }
}

impl TestApp {
    /// Sends a request and returns the status with the decoded JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, body) = self.send_raw(method, uri, cookie, body).await;
        (status, body)
    }

    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, set_cookie, value)
    }

    /// Registers an account and returns its `session=...` cookie and user id.
    pub async fn sign_up(&self, email: &str) -> (String, String) {
        let (status, set_cookie, body) = self
            .send_raw(
                "POST",
                "/auth/signup",
                None,
                Some(json!({ "email": email, "password": "hunter22" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let cookie = set_cookie
            .expect("No session cookie")
            .split(';')
            .next()
            .unwrap()
            .to_string();
        (cookie, body["user_id"].as_str().unwrap().to_string())
    }

    /// Creates an instrument and a course with `lessons` lessons authored by `cookie`.
    pub async fn create_course(&self, cookie: &str, name: &str, lessons: usize) -> Value {
        let (status, instrument) = self
            .send("POST", "/instruments", Some(cookie), Some(json!({ "name": "Guitar" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let lessons: Vec<Value> = (1..=lessons)
            .map(|n| {
                json!({
                    "id": n,
                    "name": format!("Lesson {}", n),
                    "video_url": format!("https://videos.example/{}", n)
                })
            })
            .collect();
        let (status, course) = self
            .send(
                "POST",
                "/courses",
                Some(cookie),
                Some(json!({
                    "name": name,
                    "description": "Twelve bars at a time",
                    "instrument_id": instrument["id"],
                    "lessons": lessons
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        course
    }
}
