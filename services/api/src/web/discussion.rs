//! services/api/src/web/discussion.rs
//!
//! Lesson comments and the tutor notifications they raise.

use crate::web::{
    comment_feed::{comment_responses, CommentTopic},
    dto::{CommentResponse, NotificationResponse, PostCommentRequest},
    rest::core_error,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use music_school_core::{
    domain::{LessonId, Session},
    notifications::{self, NewComment},
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// GET the comments on one lesson, newest first.
#[utoipa::path(
    get,
    path = "/courses/{id}/lessons/{lesson_id}/comments",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = String, Path, description = "Lesson id")
    ),
    responses(
        (status = 200, description = "Comments, newest first", body = [CommentResponse]),
        (status = 404, description = "Course not found")
    )
)]
pub async fn list_comments_handler(
    State(state): State<Arc<AppState>>,
    Path((course_id, lesson_id)): Path<(Uuid, String)>,
) -> Result<Json<Vec<CommentResponse>>, (StatusCode, String)> {
    let course = state
        .db
        .get_course(course_id)
        .await
        .map_err(|e| core_error(e.into()))?;

    let comments = comment_responses(
        state.db.as_ref(),
        course_id,
        &LessonId::from(lesson_id),
        Some(course.creator_id),
    )
    .await
    .map_err(core_error)?;
    Ok(Json(comments))
}

/// POST a comment on a lesson. The course creator is notified in-app and by email
/// unless they wrote it themselves.
#[utoipa::path(
    post,
    path = "/courses/{id}/lessons/{lesson_id}/comments",
    request_body = PostCommentRequest,
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = String, Path, description = "Lesson id")
    ),
    responses(
        (status = 201, description = "Comment stored", body = CommentResponse),
        (status = 400, description = "Empty comment"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn post_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((course_id, lesson_id)): Path<(Uuid, String)>,
    Json(req): Json<PostCommentRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let course = state
        .db
        .get_course(course_id)
        .await
        .map_err(|e| core_error(e.into()))?;

    let instructor_email = match state.db.get_user(course.creator_id).await {
        Ok(creator) => Some(creator.email),
        Err(e) => {
            warn!("No email on file for course creator {}: {:?}", course.creator_id, e);
            None
        }
    };

    let lesson_id = LessonId::from(lesson_id);
    let posted = notifications::post_comment(
        state.db.as_ref(),
        state.relay.clone(),
        Some(&session),
        NewComment {
            course_id,
            lesson_id: lesson_id.clone(),
            text: req.text,
            course_creator_id: Some(course.creator_id),
            course_name: Some(course.name),
            instructor_email,
        },
    )
    .await
    .map_err(core_error)?;

    state.comment_hub.publish(CommentTopic {
        course_id,
        lesson_id,
    });

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::new(posted.comment, Some(course.creator_id))),
    ))
}

/// GET the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    responses((status = 200, description = "Notifications, newest first", body = [NotificationResponse]))
)]
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<NotificationResponse>>, (StatusCode, String)> {
    let list = notifications::list_notifications(state.db.as_ref(), Some(&session))
        .await
        .map_err(core_error)?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

/// POST to mark one of the caller's notifications as read.
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "No such notification for this user")
    )
)]
pub async fn mark_notification_read_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    notifications::mark_notification_read(state.db.as_ref(), Some(&session), id)
        .await
        .map_err(core_error)?;
    Ok(StatusCode::NO_CONTENT)
}
