//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, the router that wires
//! every endpoint together, and the mapping from domain errors to HTTP replies.

use crate::web::{
    account, auth, catalog, comment_feed::comment_feed_handler, discussion, dto, learning,
    middleware::require_auth, state::AppState,
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use music_school_core::CoreError;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        account::me_handler,
        account::update_profile_handler,
        account::navigation_handler,
        account::list_users_handler,
        account::toggle_role_handler,
        catalog::list_instruments_handler,
        catalog::add_instrument_handler,
        catalog::delete_instrument_handler,
        catalog::list_instrument_courses_handler,
        catalog::get_course_handler,
        catalog::create_course_handler,
        catalog::update_course_handler,
        catalog::delete_course_handler,
        catalog::list_authored_courses_handler,
        learning::enroll_handler,
        learning::my_courses_handler,
        learning::course_progress_handler,
        learning::batch_progress_handler,
        learning::complete_lesson_handler,
        discussion::list_comments_handler,
        discussion::post_comment_handler,
        discussion::list_notifications_handler,
        discussion::mark_notification_read_handler,
    ),
    components(
        schemas(
            auth::SignupRequest, auth::LoginRequest, auth::AuthResponse,
            dto::InstrumentResponse, dto::NewInstrumentRequest, dto::LessonIdInput,
            dto::LessonPayload, dto::LessonResponse, dto::CourseDraftRequest,
            dto::CourseResponse, dto::EnrollmentResponse, dto::EnrolledCourseResponse,
            dto::CompleteLessonRequest, dto::CompleteLessonResponse, dto::ProgressResponse,
            dto::BatchProgressRequest, dto::BatchProgressResponse, dto::PostCommentRequest,
            dto::CommentResponse, dto::NotificationResponse, dto::UserResponse,
            dto::ProfileRequest, dto::NavigationResponse, dto::RoleResponse,
        )
    ),
    tags(
        (name = "Music School API", description = "Courses, lesson progress and discussion for the music school.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Converts a domain error into the `(status, message)` pair handlers return.
pub fn core_error(e: CoreError) -> (StatusCode, String) {
    match e {
        CoreError::NotAuthenticated => (StatusCode::UNAUTHORIZED, e.to_string()),
        CoreError::AlreadyEnrolled { .. } => (StatusCode::CONFLICT, e.to_string()),
        CoreError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        CoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        CoreError::Port(port) => {
            error!("Store operation failed: {:?}", port);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}

//=========================================================================================
// Router
//=========================================================================================

/// Builds the full API router. Everything outside `/auth` requires a session.
///
/// Admin and tutor routes are gated by the UI only; the handlers do not check roles.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // --- Account ---
        .route("/me", get(account::me_handler))
        .route("/me/profile", put(account::update_profile_handler))
        .route("/me/navigation", get(account::navigation_handler))
        .route("/me/courses", get(learning::my_courses_handler))
        .route("/me/authored-courses", get(catalog::list_authored_courses_handler))
        // --- Admin ---
        .route("/admin/users", get(account::list_users_handler))
        .route(
            "/admin/users/{id}/toggle-role",
            post(account::toggle_role_handler),
        )
        // --- Catalog ---
        .route(
            "/instruments",
            get(catalog::list_instruments_handler).post(catalog::add_instrument_handler),
        )
        .route("/instruments/{id}", delete(catalog::delete_instrument_handler))
        .route(
            "/instruments/{id}/courses",
            get(catalog::list_instrument_courses_handler),
        )
        .route("/courses", post(catalog::create_course_handler))
        .route(
            "/courses/{id}",
            get(catalog::get_course_handler)
                .put(catalog::update_course_handler)
                .delete(catalog::delete_course_handler),
        )
        // --- Learning ---
        .route("/courses/{id}/enroll", post(learning::enroll_handler))
        .route("/courses/{id}/progress", get(learning::course_progress_handler))
        .route("/progress", post(learning::batch_progress_handler))
        .route(
            "/courses/{id}/lessons/{lesson_id}/complete",
            post(learning::complete_lesson_handler),
        )
        // --- Discussion ---
        .route(
            "/courses/{id}/lessons/{lesson_id}/comments",
            get(discussion::list_comments_handler).post(discussion::post_comment_handler),
        )
        .route("/notifications", get(discussion::list_notifications_handler))
        .route(
            "/notifications/{id}/read",
            post(discussion::mark_notification_read_handler),
        )
        .route("/ws/comments", get(comment_feed_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state)
}
