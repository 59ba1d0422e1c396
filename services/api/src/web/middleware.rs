//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use music_school_core::domain::Session;
use std::sync::Arc;
use tracing::error;

use crate::web::{auth::session_id_from_headers, state::AppState};

/// Middleware that validates the auth session cookie and resolves the caller.
///
/// If valid, inserts a [`Session`] into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Parse session ID from cookie
    let auth_session_id =
        session_id_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Validate auth session in database, get user_id
    let user_id = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // 3. Load the account the session belongs to
    let user = state.db.get_user(user_id).await.map_err(|e| {
        error!("Session {} points at a missing user: {:?}", user_id, e);
        StatusCode::UNAUTHORIZED
    })?;

    // 4. Insert the session into request extensions
    req.extensions_mut().insert(Session {
        user_id: user.id,
        email: user.email,
    });

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
