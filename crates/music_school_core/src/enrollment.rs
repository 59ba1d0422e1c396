//! crates/music_school_core/src/enrollment.rs
//!
//! Course enrollment bookkeeping.
//!
//! The "one enrollment per (user, course)" rule is a read-then-write guard. Two
//! concurrent calls for the same pair can both pass the check and both write.

use crate::domain::{Course, Enrollment, Session};
use crate::error::{require_session, CoreError, CoreResult};
use crate::ports::{DatabaseService, PortError};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Enrolls the signed-in user in `course_id`.
pub async fn enroll(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    course_id: Uuid,
) -> CoreResult<Enrollment> {
    let session = require_session(session)?;
    let user_id = session.user_id;

    let existing = db.find_enrollments(user_id, course_id).await?;
    if !existing.is_empty() {
        return Err(CoreError::AlreadyEnrolled { user_id, course_id });
    }

    let enrollment = Enrollment {
        id: Uuid::new_v4(),
        user_id,
        course_id,
        enrolled_at: Utc::now(),
    };
    db.create_enrollment(&enrollment).await?;

    info!("User {} successfully enrolled in course {}", user_id, course_id);
    Ok(enrollment)
}

pub async fn is_enrolled(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    course_id: Uuid,
) -> CoreResult<bool> {
    let session = require_session(session)?;
    Ok(!db.find_enrollments(session.user_id, course_id).await?.is_empty())
}

/// The courses the signed-in user is enrolled in. Enrollments pointing at deleted
/// courses are skipped.
pub async fn list_enrolled_courses(
    db: &dyn DatabaseService,
    session: Option<&Session>,
) -> CoreResult<Vec<Course>> {
    let session = require_session(session)?;
    let enrollments = db.list_enrollments_for_user(session.user_id).await?;

    let lookups = enrollments.iter().map(|e| db.get_course(e.course_id));
    let results = futures::future::join_all(lookups).await;

    let mut courses = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(course) => {
                if !courses.iter().any(|c: &Course| c.id == course.id) {
                    courses.push(course);
                }
            }
            Err(PortError::NotFound(what)) => debug!("Skipping dangling enrollment: {}", what),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(courses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_course;
    use crate::memory::InMemoryDatabase;

    fn student() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "student@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn second_enrollment_is_rejected_and_leaves_one_record() {
        let db = InMemoryDatabase::new();
        let session = student();
        let course_id = Uuid::new_v4();

        enroll(&db, Some(&session), course_id).await.unwrap();
        let err = enroll(&db, Some(&session), course_id).await.unwrap_err();

        assert!(matches!(err, CoreError::AlreadyEnrolled { .. }));
        assert_eq!(db.enrollment_count(session.user_id, course_id), 1);
    }

    #[tokio::test]
    async fn enrollment_requires_a_session() {
        let db = InMemoryDatabase::new();
        let err = enroll(&db, None, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotAuthenticated));
    }

    #[tokio::test]
    async fn different_users_can_enroll_in_the_same_course() {
        let db = InMemoryDatabase::new();
        let course_id = Uuid::new_v4();
        let (a, b) = (student(), student());

        enroll(&db, Some(&a), course_id).await.unwrap();
        enroll(&db, Some(&b), course_id).await.unwrap();

        assert!(is_enrolled(&db, Some(&a), course_id).await.unwrap());
        assert!(is_enrolled(&db, Some(&b), course_id).await.unwrap());
    }

    #[tokio::test]
    async fn enrolled_courses_skip_deleted_courses() {
        let db = InMemoryDatabase::new();
        let session = student();
        let kept = sample_course(Uuid::new_v4(), 3);
        let removed = sample_course(Uuid::new_v4(), 2);
        db.create_course(&kept).await.unwrap();
        db.create_course(&removed).await.unwrap();

        enroll(&db, Some(&session), kept.id).await.unwrap();
        enroll(&db, Some(&session), removed.id).await.unwrap();
        db.delete_course(removed.id).await.unwrap();

        let courses = list_enrolled_courses(&db, Some(&session)).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, kept.id);
    }
}
