//! services/api/src/web/dto.rs
//!
//! Request and response payloads for the REST API, kept separate from the core
//! domain types so the wire format can evolve on its own.

use chrono::{DateTime, Utc};
use music_school_core::catalog::CourseDraft;
use music_school_core::domain::{
    Comment, Course, Instrument, Lesson, LessonId, Notification, User,
};
use music_school_core::navigation::Navigation;
use music_school_core::progress::CourseProgress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct InstrumentResponse {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
}

impl From<Instrument> for InstrumentResponse {
    fn from(i: Instrument) -> Self {
        Self {
            id: i.id,
            name: i.name,
            image_url: i.image_url,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct NewInstrumentRequest {
    pub name: String,
    pub image_url: Option<String>,
}

/// Browsers have historically sent lesson ids as numbers; both forms are accepted.
#[derive(Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LessonIdInput {
    Text(String),
    Number(u64),
}

impl From<LessonIdInput> for LessonId {
    fn from(raw: LessonIdInput) -> Self {
        match raw {
            LessonIdInput::Text(s) => LessonId::from(s),
            LessonIdInput::Number(n) => LessonId::from(n),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LessonPayload {
    /// Generated when omitted.
    pub id: Option<LessonIdInput>,
    pub name: String,
    pub video_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct LessonResponse {
    pub id: String,
    pub name: String,
    pub video_url: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CourseDraftRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub instrument_id: Uuid,
    #[serde(default)]
    pub lessons: Vec<LessonPayload>,
}

impl From<CourseDraftRequest> for CourseDraft {
    fn from(req: CourseDraftRequest) -> Self {
        CourseDraft {
            name: req.name,
            description: req.description,
            instrument_id: req.instrument_id,
            lessons: req
                .lessons
                .into_iter()
                .map(|l| Lesson {
                    id: l
                        .id
                        .map(LessonId::from)
                        .unwrap_or_else(|| LessonId::new(Uuid::new_v4())),
                    name: l.name,
                    video_url: l.video_url,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub instrument_id: Uuid,
    pub creator_id: Uuid,
    pub lessons: Vec<LessonResponse>,
    pub lesson_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(c: Course) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            instrument_id: c.instrument_id,
            creator_id: c.creator_id,
            lessons: c
                .lessons
                .into_iter()
                .map(|l| LessonResponse {
                    id: l.id.into_string(),
                    name: l.name,
                    video_url: l.video_url,
                })
                .collect(),
            lesson_count: c.lesson_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

//=========================================================================================
// Enrollment & Progress
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct EnrolledCourseResponse {
    pub course: CourseResponse,
    pub progress_percentage: u8,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct CompleteLessonRequest {
    /// Lesson count the client is looking at. Falls back to the stored course's count.
    pub total_lessons: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct ProgressResponse {
    pub course_id: Uuid,
    pub completed_lessons: Vec<String>,
    pub progress_percentage: u8,
}

impl ProgressResponse {
    pub fn new(course_id: Uuid, progress: CourseProgress) -> Self {
        Self {
            course_id,
            completed_lessons: progress
                .completed_lessons
                .into_iter()
                .map(LessonId::into_string)
                .collect(),
            progress_percentage: progress.progress_percentage,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CompleteLessonResponse {
    pub course_id: Uuid,
    pub lesson_id: String,
    pub progress_percentage: u8,
}

#[derive(Deserialize, ToSchema)]
pub struct BatchProgressRequest {
    pub course_ids: Vec<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct BatchProgressResponse {
    /// Course id to completion percentage.
    pub progress: HashMap<String, u8>,
}

//=========================================================================================
// Discussion
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct PostCommentRequest {
    pub text: String,
}

#[derive(Serialize, ToSchema, Clone, Debug)]
pub struct CommentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub lesson_id: String,
    pub text: String,
    pub author_id: Uuid,
    pub author_email: String,
    /// True when the author created the course.
    pub by_instructor: bool,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: Comment, course_creator_id: Option<Uuid>) -> Self {
        Self {
            by_instructor: course_creator_id == Some(comment.author_id),
            id: comment.id,
            course_id: comment.course_id,
            lesson_id: comment.lesson_id.into_string(),
            text: comment.text,
            author_id: comment.author_id,
            author_email: comment.author_email,
            created_at: comment.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub message: String,
    pub sender_email: String,
    pub course_id: Uuid,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            message: n.message,
            sender_email: n.sender_email,
            course_id: n.course_id,
            read: n.read,
            created_at: n.created_at,
        }
    }
}

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    /// Resolved role; accounts without one report `student`.
    pub role: String,
    pub bio: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            role: u.role.unwrap_or_default().to_string(),
            bio: u.bio,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Serialize, ToSchema)]
pub struct NavigationResponse {
    pub role: String,
    pub show_admin_panel: bool,
    pub show_course_authoring: bool,
    pub show_notifications: bool,
}

impl From<Navigation> for NavigationResponse {
    fn from(n: Navigation) -> Self {
        Self {
            role: n.role.to_string(),
            show_admin_panel: n.show_admin_panel,
            show_course_authoring: n.show_course_authoring,
            show_notifications: n.show_notifications,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RoleResponse {
    pub user_id: Uuid,
    pub role: String,
}
