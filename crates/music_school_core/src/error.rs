//! crates/music_school_core/src/error.rs
//!
//! The error type returned by the core domain operations.

use crate::ports::PortError;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The operation needs a signed-in user and none was supplied.
    #[error("You must be logged in to do that")]
    NotAuthenticated,

    #[error("User {user_id} is already enrolled in course {course_id}")]
    AlreadyEnrolled { user_id: Uuid, course_id: Uuid },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A failure reported by the document store.
    #[error("Store error: {0}")]
    Port(PortError),
}

impl From<PortError> for CoreError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => CoreError::NotFound(what),
            other => CoreError::Port(other),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Unwraps the caller's session or fails with [`CoreError::NotAuthenticated`].
pub(crate) fn require_session(
    session: Option<&crate::domain::Session>,
) -> CoreResult<&crate::domain::Session> {
    session.ok_or(CoreError::NotAuthenticated)
}
