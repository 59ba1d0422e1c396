//! services/api/src/web/learning.rs
//!
//! Handlers for enrollment and lesson progress.

use crate::web::{
    dto::{
        BatchProgressRequest, BatchProgressResponse, CompleteLessonRequest,
        CompleteLessonResponse, EnrolledCourseResponse, EnrollmentResponse, ProgressResponse,
    },
    rest::core_error,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use music_school_core::{
    domain::{LessonId, Session},
    enrollment, progress,
};
use std::sync::Arc;
use uuid::Uuid;

type HandlerResult<T> = Result<T, (StatusCode, String)>;

/// Enroll the caller in a course.
#[utoipa::path(
    post,
    path = "/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Already enrolled")
    )
)]
pub async fn enroll_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(course_id): Path<Uuid>,
) -> HandlerResult<impl IntoResponse> {
    state
        .db
        .get_course(course_id)
        .await
        .map_err(|e| core_error(e.into()))?;

    let enrollment = enrollment::enroll(state.db.as_ref(), Some(&session), course_id)
        .await
        .map_err(core_error)?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse {
            id: enrollment.id,
            course_id: enrollment.course_id,
            enrolled_at: enrollment.enrolled_at,
        }),
    ))
}

/// The caller's enrolled courses with their completion percentages.
#[utoipa::path(
    get,
    path = "/me/courses",
    responses((status = 200, description = "Enrolled courses", body = [EnrolledCourseResponse]))
)]
pub async fn my_courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> HandlerResult<Json<Vec<EnrolledCourseResponse>>> {
    let db = state.db.as_ref();
    let courses = enrollment::list_enrolled_courses(db, Some(&session))
        .await
        .map_err(core_error)?;

    let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    let percentages = progress::get_progress_for_courses(db, session.user_id, &ids)
        .await
        .map_err(core_error)?;

    Ok(Json(
        courses
            .into_iter()
            .map(|course| EnrolledCourseResponse {
                progress_percentage: percentages.get(&course.id).copied().unwrap_or(0),
                course: course.into(),
            })
            .collect(),
    ))
}

/// The caller's progress in one course.
#[utoipa::path(
    get,
    path = "/courses/{id}/progress",
    params(("id" = Uuid, Path, description = "Course id")),
    responses((status = 200, description = "Progress, empty when never started", body = ProgressResponse))
)]
pub async fn course_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(course_id): Path<Uuid>,
) -> HandlerResult<Json<ProgressResponse>> {
    let progress = progress::get_course_progress(state.db.as_ref(), session.user_id, course_id)
        .await
        .map_err(core_error)?;
    Ok(Json(ProgressResponse::new(course_id, progress)))
}

/// Completion percentages for several courses at once.
#[utoipa::path(
    post,
    path = "/progress",
    request_body = BatchProgressRequest,
    responses((status = 200, description = "Percentage per course id", body = BatchProgressResponse))
)]
pub async fn batch_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(req): Json<BatchProgressRequest>,
) -> HandlerResult<Json<BatchProgressResponse>> {
    let map = progress::get_progress_for_courses(state.db.as_ref(), session.user_id, &req.course_ids)
        .await
        .map_err(core_error)?;
    Ok(Json(BatchProgressResponse {
        progress: map.into_iter().map(|(id, pct)| (id.to_string(), pct)).collect(),
    }))
}

/// Mark a lesson as completed by the caller.
///
/// The lesson count used for the percentage is the one the client sends; when it
/// sends none, or no body at all, the stored course's count is used.
#[utoipa::path(
    post,
    path = "/courses/{id}/lessons/{lesson_id}/complete",
    request_body = CompleteLessonRequest,
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = String, Path, description = "Lesson id")
    ),
    responses(
        (status = 200, description = "Current percentage", body = CompleteLessonResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn complete_lesson_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((course_id, lesson_id)): Path<(Uuid, String)>,
    body: Option<Json<CompleteLessonRequest>>,
) -> HandlerResult<Json<CompleteLessonResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let total_lessons = match req.total_lessons {
        Some(total) => total,
        None => {
            let course = state
                .db
                .get_course(course_id)
                .await
                .map_err(|e| core_error(e.into()))?;
            course.lesson_count as i64
        }
    };

    let lesson_id = LessonId::from(lesson_id);
    let progress_percentage = progress::mark_lesson_complete(
        state.db.as_ref(),
        Some(&session),
        course_id,
        lesson_id.clone(),
        total_lessons,
    )
    .await
    .map_err(core_error)?;

    Ok(Json(CompleteLessonResponse {
        course_id,
        lesson_id: lesson_id.into_string(),
        progress_percentage,
    }))
}
