//! crates/music_school_core/src/progress.rs
//!
//! Lesson completion tracking per (user, course).
//!
//! `mark_lesson_complete` is a read-modify-write against the store with no version
//! check. The lesson count is whatever the caller passes; it is not re-read from
//! the course.

use crate::domain::{LessonId, ProgressRecord, Session};
use crate::error::{require_session, CoreResult};
use crate::ports::DatabaseService;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// The read-only view of a user's progress in one course.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseProgress {
    pub completed_lessons: Vec<LessonId>,
    pub progress_percentage: u8,
}

/// `round(100 * completed / total)`, clamped to 100; a course without lessons
/// counts as finished.
pub fn completion_percentage(completed: usize, total_lessons: i64) -> u8 {
    if total_lessons <= 0 {
        return 100;
    }
    let ratio = completed as f64 / total_lessons as f64;
    (ratio * 100.0).round().min(100.0) as u8
}

/// Records `lesson_id` as completed and returns the resulting percentage.
///
/// Marking an already-completed lesson changes nothing and returns the stored
/// percentage.
pub async fn mark_lesson_complete(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    course_id: Uuid,
    lesson_id: impl Into<LessonId>,
    total_lessons: i64,
) -> CoreResult<u8> {
    let session = require_session(session)?;
    let lesson_id = lesson_id.into();
    let key = ProgressRecord::key_for(session.user_id, course_id);

    let mut record = db.get_progress(&key).await?.unwrap_or(ProgressRecord {
        user_id: session.user_id,
        course_id,
        completed_lessons: Vec::new(),
        progress_percentage: 0,
    });

    if record.is_complete(&lesson_id) {
        debug!("Lesson {} already complete for {}", lesson_id, key);
        return Ok(record.progress_percentage);
    }

    record.completed_lessons.push(lesson_id);
    record.progress_percentage =
        completion_percentage(record.completed_lessons.len(), total_lessons);
    db.save_progress(&record).await?;

    info!(
        "Progress for {} is now {}% ({} lessons)",
        key,
        record.progress_percentage,
        record.completed_lessons.len()
    );
    Ok(record.progress_percentage)
}

/// Progress in one course, `{ [], 0 }` when nothing has been recorded yet.
pub async fn get_course_progress(
    db: &dyn DatabaseService,
    user_id: Uuid,
    course_id: Uuid,
) -> CoreResult<CourseProgress> {
    let key = ProgressRecord::key_for(user_id, course_id);
    Ok(db
        .get_progress(&key)
        .await?
        .map(|record| CourseProgress {
            completed_lessons: record.completed_lessons,
            progress_percentage: record.progress_percentage,
        })
        .unwrap_or_default())
}

/// Percentage per requested course; courses without a record map to 0.
pub async fn get_progress_for_courses(
    db: &dyn DatabaseService,
    user_id: Uuid,
    course_ids: &[Uuid],
) -> CoreResult<HashMap<Uuid, u8>> {
    let mut progress: HashMap<Uuid, u8> = course_ids.iter().map(|id| (*id, 0)).collect();
    if course_ids.is_empty() {
        return Ok(progress);
    }

    for record in db.list_progress_for_courses(user_id, course_ids).await? {
        progress.insert(record.course_id, record.progress_percentage);
    }
    Ok(progress)
}
