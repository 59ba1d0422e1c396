//! services/api/src/web/catalog.rs
//!
//! Handlers for instruments and course authoring.

use crate::web::{
    dto::{CourseDraftRequest, CourseResponse, InstrumentResponse, NewInstrumentRequest},
    rest::core_error,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use music_school_core::{catalog, domain::Session};
use std::sync::Arc;
use uuid::Uuid;

type HandlerResult<T> = Result<T, (StatusCode, String)>;

/// List every instrument.
#[utoipa::path(
    get,
    path = "/instruments",
    responses((status = 200, description = "All instruments", body = [InstrumentResponse]))
)]
pub async fn list_instruments_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<InstrumentResponse>>> {
    let instruments = catalog::list_instruments(state.db.as_ref())
        .await
        .map_err(core_error)?;
    Ok(Json(instruments.into_iter().map(Into::into).collect()))
}

/// Add an instrument (admin).
#[utoipa::path(
    post,
    path = "/instruments",
    request_body = NewInstrumentRequest,
    responses(
        (status = 201, description = "Instrument added", body = InstrumentResponse),
        (status = 400, description = "Name missing")
    )
)]
pub async fn add_instrument_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewInstrumentRequest>,
) -> HandlerResult<impl IntoResponse> {
    let instrument = catalog::add_instrument(state.db.as_ref(), &req.name, req.image_url.as_deref())
        .await
        .map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(InstrumentResponse::from(instrument))))
}

/// Delete an instrument (admin).
#[utoipa::path(
    delete,
    path = "/instruments/{id}",
    params(("id" = Uuid, Path, description = "Instrument id")),
    responses((status = 204, description = "Instrument deleted"))
)]
pub async fn delete_instrument_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<StatusCode> {
    catalog::delete_instrument(state.db.as_ref(), id)
        .await
        .map_err(core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the courses filed under an instrument.
#[utoipa::path(
    get,
    path = "/instruments/{id}/courses",
    params(("id" = Uuid, Path, description = "Instrument id")),
    responses(
        (status = 200, description = "Courses for the instrument", body = [CourseResponse]),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn list_instrument_courses_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Json<Vec<CourseResponse>>> {
    state
        .db
        .get_instrument(id)
        .await
        .map_err(|e| core_error(e.into()))?;
    let courses = catalog::list_courses_by_instrument(state.db.as_ref(), id)
        .await
        .map_err(core_error)?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

/// Fetch one course with its lessons.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "The course", body = CourseResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Json<CourseResponse>> {
    let course = catalog::get_course(state.db.as_ref(), id)
        .await
        .map_err(core_error)?;
    Ok(Json(course.into()))
}

/// Create a course authored by the caller.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseDraftRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Name missing"),
        (status = 404, description = "Instrument not found")
    )
)]
pub async fn create_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(req): Json<CourseDraftRequest>,
) -> HandlerResult<impl IntoResponse> {
    let course = catalog::create_course(state.db.as_ref(), Some(&session), req.into())
        .await
        .map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

/// Replace a course's details and lesson list.
#[utoipa::path(
    put,
    path = "/courses/{id}",
    request_body = CourseDraftRequest,
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 404, description = "Course or instrument not found")
    )
)]
pub async fn update_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(req): Json<CourseDraftRequest>,
) -> HandlerResult<Json<CourseResponse>> {
    let course = catalog::update_course(state.db.as_ref(), Some(&session), id, req.into())
        .await
        .map_err(core_error)?;
    Ok(Json(course.into()))
}

/// Delete a course.
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses((status = 204, description = "Course deleted"))
)]
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> HandlerResult<StatusCode> {
    catalog::delete_course(state.db.as_ref(), Some(&session), id)
        .await
        .map_err(core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Courses the caller has authored.
#[utoipa::path(
    get,
    path = "/me/authored-courses",
    responses((status = 200, description = "Authored courses", body = [CourseResponse]))
)]
pub async fn list_authored_courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> HandlerResult<Json<Vec<CourseResponse>>> {
    let courses = catalog::list_authored_courses(state.db.as_ref(), Some(&session))
        .await
        .map_err(core_error)?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}
