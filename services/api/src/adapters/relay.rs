//! services/api/src/adapters/relay.rs
//!
//! Implements the `EmailRelayService` port by calling the relay process's
//! `POST /api/send-email` endpoint with `reqwest`.

use async_trait::async_trait;
use music_school_core::domain::EmailMessage;
use music_school_core::ports::{EmailRelayService, RelayError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on a single relay call.
const RELAY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpRelayAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayAdapter {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(RELAY_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/send-email", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmailRelayService for HttpRelayAdapter {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), RelayError> {
        let body = SendEmailRequest {
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Unreachable(e.to_string()))?;

        let status = response.status();
        let parsed = response.json::<SendEmailResponse>().await.ok();

        match parsed {
            Some(reply) if status.is_success() && reply.success => Ok(()),
            Some(reply) => Err(RelayError::Rejected {
                status: status.as_u16(),
                message: reply.error.unwrap_or_else(|| "unknown relay error".to_string()),
            }),
            None => Err(RelayError::Rejected {
                status: status.as_u16(),
                message: "unreadable relay response".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_joined_without_double_slash() {
        let adapter = HttpRelayAdapter::new("http://localhost:5000/").unwrap();
        assert_eq!(adapter.endpoint(), "http://localhost:5000/api/send-email");
    }

    #[tokio::test]
    async fn unreachable_relay_is_reported() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let adapter = HttpRelayAdapter::new("http://127.0.0.1:9").unwrap();
        let err = adapter
            .send_email(&EmailMessage {
                to: "t@example.com".to_string(),
                subject: "s".to_string(),
                text: "t".to_string(),
                html: "<p>t</p>".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Unreachable(_)));
    }
}
