//! services/relay/src/web.rs
//!
//! The single relay route. Browsers and the api service post here; the relay
//! hands the message to its [`Mailer`] and reports the outcome.

use crate::mailer::{Mailer, OutgoingEmail};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum SendEmailResponse {
    Sent { success: bool, message: String },
    Failed { success: bool, error: String },
}

fn failed(error: String) -> (StatusCode, Json<SendEmailResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SendEmailResponse::Failed {
            success: false,
            error,
        }),
    )
}

/// POST /api/send-email
///
/// Every failure, an unreadable body included, is answered with 500 and a JSON error.
pub async fn send_email_handler(
    State(mailer): State<Arc<dyn Mailer>>,
    body: Result<Json<OutgoingEmail>, JsonRejection>,
) -> (StatusCode, Json<SendEmailResponse>) {
    let email = match body {
        Ok(Json(email)) => email,
        Err(rejection) => {
            error!("Rejected send-email request: {}", rejection.body_text());
            return failed(rejection.body_text());
        }
    };

    match mailer.send(&email).await {
        Ok(()) => {
            info!("Email sent to {}", email.to);
            (
                StatusCode::OK,
                Json(SendEmailResponse::Sent {
                    success: true,
                    message: "Email sent successfully".to_string(),
                }),
            )
        }
        Err(e) => {
            error!("Error sending email to {}: {}", email.to, e);
            failed(e.to_string())
        }
    }
}

pub fn build_router(mailer: Arc<dyn Mailer>) -> Router {
    Router::new()
        .route("/api/send-email", post(send_email_handler))
        .layer(CorsLayer::permissive())
        .with_state(mailer)
}
