//! crates/music_school_core/src/domain.rs
//!
//! Defines the pure, core data structures for the music school.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Placeholder artwork used when an admin adds an instrument without an image.
pub const DEFAULT_INSTRUMENT_IMAGE: &str = "https://via.placeholder.com/150";

//=========================================================================================
// Identity
//=========================================================================================

/// The authenticated caller of a core operation.
///
/// Handed explicitly to every operation that needs a signed-in user; the core never
/// reads an ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Student,
    Tutor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "tutor" => Ok(Role::Tutor),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// An account holder. `role` is `None` for accounts that were never assigned one.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
}

/// A single video lesson, embedded in its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: LessonId,
    pub name: String,
    pub video_url: String,
}

/// Lesson identifiers are always compared as strings, whatever the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LessonId(String);

impl LessonId {
    pub fn new(raw: impl ToString) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LessonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LessonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for LessonId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub instrument_id: Uuid,
    pub creator_id: Uuid,
    pub lessons: Vec<Lesson>,
    /// Always equal to `lessons.len()` at the time the course was written.
    pub lesson_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn lesson(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| &l.id == lesson_id)
    }
}

//=========================================================================================
// Enrollment & Progress
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

/// Per-user, per-course lesson completion state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub user_id: Uuid,
    pub course_id: Uuid,
    /// Insertion-ordered, never contains duplicates.
    pub completed_lessons: Vec<LessonId>,
    /// 0..=100.
    pub progress_percentage: u8,
}

impl ProgressRecord {
    /// The composite document key, `{userId}_{courseId}`.
    pub fn key_for(user_id: Uuid, course_id: Uuid) -> String {
        format!("{}_{}", user_id, course_id)
    }

    pub fn key(&self) -> String {
        Self::key_for(self.user_id, self.course_id)
    }

    pub fn is_complete(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.contains(lesson_id)
    }
}

//=========================================================================================
// Discussion
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub lesson_id: LessonId,
    pub text: String,
    pub author_id: Uuid,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
}

/// A cross-user alert, currently only raised for comments on a tutor's course.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub message: String,
    pub sender_email: String,
    pub course_id: Uuid,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// The payload accepted by the outbound email relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}
