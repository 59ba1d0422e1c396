//! crates/music_school_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the hosted document store and the email relay.

use crate::domain::{
    Comment, Course, EmailMessage, Enrollment, Instrument, LessonId, Notification,
    ProgressRecord, Role, User, UserCredentials,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failure to hand a message to the email relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Email relay unreachable: {0}")]
    Unreachable(String),
    #[error("Email relay rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The document store shared by every client.
///
/// None of these operations are transactional; callers composing a read with a
/// later write get no isolation between the two.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(&self, user: &User) -> PortResult<()>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn update_user_role(&self, user_id: Uuid, role: Role) -> PortResult<()>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
        bio: &str,
        role: Role,
    ) -> PortResult<()>;

    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Instruments ---
    async fn list_instruments(&self) -> PortResult<Vec<Instrument>>;

    async fn get_instrument(&self, instrument_id: Uuid) -> PortResult<Instrument>;

    async fn create_instrument(&self, instrument: &Instrument) -> PortResult<()>;

    async fn delete_instrument(&self, instrument_id: Uuid) -> PortResult<()>;

    // --- Courses ---
    async fn get_course(&self, course_id: Uuid) -> PortResult<Course>;

    async fn list_courses_by_instrument(&self, instrument_id: Uuid) -> PortResult<Vec<Course>>;

    async fn list_courses_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Course>>;

    async fn create_course(&self, course: &Course) -> PortResult<()>;

    async fn update_course(&self, course: &Course) -> PortResult<()>;

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()>;

    // --- Enrollments ---
    async fn find_enrollments(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Vec<Enrollment>>;

    async fn list_enrollments_for_user(&self, user_id: Uuid) -> PortResult<Vec<Enrollment>>;

    async fn create_enrollment(&self, enrollment: &Enrollment) -> PortResult<()>;

    // --- Progress ---
    /// Point read by the composite `{userId}_{courseId}` key.
    async fn get_progress(&self, key: &str) -> PortResult<Option<ProgressRecord>>;

    /// Merge-writes the record under its composite key, creating it if absent.
    async fn save_progress(&self, record: &ProgressRecord) -> PortResult<()>;

    async fn list_progress_for_courses(
        &self,
        user_id: Uuid,
        course_ids: &[Uuid],
    ) -> PortResult<Vec<ProgressRecord>>;

    // --- Comments ---
    async fn create_comment(&self, comment: &Comment) -> PortResult<()>;

    /// Newest first.
    async fn list_comments(&self, course_id: Uuid, lesson_id: &LessonId) -> PortResult<Vec<Comment>>;

    // --- Notifications ---
    async fn create_notification(&self, notification: &Notification) -> PortResult<()>;

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification>;

    /// Newest first.
    async fn list_notifications_for(&self, recipient_id: Uuid) -> PortResult<Vec<Notification>>;

    async fn mark_notification_read(&self, notification_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait EmailRelayService: Send + Sync {
    /// Hands one message to the relay. No retry is attempted.
    async fn send_email(&self, message: &EmailMessage) -> Result<(), RelayError>;
}
