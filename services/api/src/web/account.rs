//! services/api/src/web/account.rs
//!
//! The caller's own account, their navigation entries, and the admin user list.

use crate::web::{
    dto::{NavigationResponse, ProfileRequest, RoleResponse, UserResponse},
    rest::core_error,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use music_school_core::{domain::Session, navigation, users};
use std::sync::Arc;
use uuid::Uuid;

/// GET /me - The caller's user record, created on first visit
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The signed-in user", body = UserResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    let user = users::ensure_user(state.db.as_ref(), Some(&session), None)
        .await
        .map_err(core_error)?;
    Ok(Json(user.into()))
}

/// PUT /me/profile - Save the tutor profile
#[utoipa::path(
    put,
    path = "/me/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile saved; the account is now a tutor", body = UserResponse),
        (status = 400, description = "Display name missing")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    let user = users::update_profile(state.db.as_ref(), Some(&session), &req.display_name, &req.bio)
        .await
        .map_err(core_error)?;
    Ok(Json(user.into()))
}

/// GET /me/navigation - Which sections the caller's role unlocks
#[utoipa::path(
    get,
    path = "/me/navigation",
    responses((status = 200, description = "Navigation entries", body = NavigationResponse))
)]
pub async fn navigation_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<NavigationResponse>, (StatusCode, String)> {
    let role = navigation::resolve_role(state.db.as_ref(), session.user_id)
        .await
        .map_err(core_error)?;
    Ok(Json(navigation::navigation_for(role).into()))
}

/// GET /admin/users - Every account
#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "All users", body = [UserResponse]))
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, (StatusCode, String)> {
    let all = users::list_users(state.db.as_ref())
        .await
        .map_err(core_error)?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// POST /admin/users/{id}/toggle-role - Switch between student and tutor
#[utoipa::path(
    post,
    path = "/admin/users/{id}/toggle-role",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The new role", body = RoleResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn toggle_role_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<RoleResponse>, (StatusCode, String)> {
    let role = users::toggle_role(state.db.as_ref(), user_id)
        .await
        .map_err(core_error)?;
    Ok(Json(RoleResponse {
        user_id,
        role: role.to_string(),
    }))
}
