//! crates/music_school_core/src/catalog.rs
//!
//! Instruments and the courses tutors author under them.

use crate::domain::{Course, Instrument, Lesson, Session, DEFAULT_INSTRUMENT_IMAGE};
use crate::error::{require_session, CoreError, CoreResult};
use crate::ports::DatabaseService;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// Instruments
//=========================================================================================

pub async fn list_instruments(db: &dyn DatabaseService) -> CoreResult<Vec<Instrument>> {
    Ok(db.list_instruments().await?)
}

pub async fn add_instrument(
    db: &dyn DatabaseService,
    name: &str,
    image_url: Option<&str>,
) -> CoreResult<Instrument> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidInput("Instrument name is required".to_string()));
    }
    let image_url = image_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_INSTRUMENT_IMAGE);

    let instrument = Instrument {
        id: Uuid::new_v4(),
        name: name.to_string(),
        image_url: image_url.to_string(),
    };
    db.create_instrument(&instrument).await?;
    info!("Instrument {} added", instrument.name);
    Ok(instrument)
}

pub async fn delete_instrument(db: &dyn DatabaseService, instrument_id: Uuid) -> CoreResult<()> {
    db.delete_instrument(instrument_id).await?;
    Ok(())
}

//=========================================================================================
// Courses
//=========================================================================================

/// The editable part of a course, as submitted by its tutor.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    pub name: String,
    pub description: String,
    pub instrument_id: Uuid,
    pub lessons: Vec<Lesson>,
}

impl CourseDraft {
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("Course name is required".to_string()));
        }
        Ok(())
    }
}

pub async fn get_course(db: &dyn DatabaseService, course_id: Uuid) -> CoreResult<Course> {
    Ok(db.get_course(course_id).await?)
}

pub async fn list_courses_by_instrument(
    db: &dyn DatabaseService,
    instrument_id: Uuid,
) -> CoreResult<Vec<Course>> {
    Ok(db.list_courses_by_instrument(instrument_id).await?)
}

/// Courses authored by the signed-in tutor.
pub async fn list_authored_courses(
    db: &dyn DatabaseService,
    session: Option<&Session>,
) -> CoreResult<Vec<Course>> {
    let session = require_session(session)?;
    Ok(db.list_courses_by_creator(session.user_id).await?)
}

pub async fn create_course(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    draft: CourseDraft,
) -> CoreResult<Course> {
    let session = require_session(session)?;
    draft.validate()?;
    db.get_instrument(draft.instrument_id).await?;

    let now = Utc::now();
    let course = Course {
        id: Uuid::new_v4(),
        name: draft.name.trim().to_string(),
        description: draft.description,
        instrument_id: draft.instrument_id,
        creator_id: session.user_id,
        lesson_count: draft.lessons.len(),
        lessons: draft.lessons,
        created_at: now,
        updated_at: now,
    };
    db.create_course(&course).await?;
    info!("Course {} created by {}", course.id, session.email);
    Ok(course)
}

pub async fn update_course(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    course_id: Uuid,
    draft: CourseDraft,
) -> CoreResult<Course> {
    let session = require_session(session)?;
    draft.validate()?;
    let existing = db.get_course(course_id).await?;
    db.get_instrument(draft.instrument_id).await?;

    let course = Course {
        id: existing.id,
        name: draft.name.trim().to_string(),
        description: draft.description,
        instrument_id: draft.instrument_id,
        creator_id: session.user_id,
        lesson_count: draft.lessons.len(),
        lessons: draft.lessons,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };
    db.update_course(&course).await?;
    info!("Course {} updated", course.id);
    Ok(course)
}

pub async fn delete_course(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    course_id: Uuid,
) -> CoreResult<()> {
    require_session(session)?;
    db.delete_course(course_id).await?;
    info!("Course {} deleted", course_id);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::LessonId;
    use crate::memory::InMemoryDatabase;

    pub(crate) fn lessons(count: usize) -> Vec<Lesson> {
        (0..count)
            .map(|i| Lesson {
                id: LessonId::new(i + 1),
                name: format!("Lesson {}", i + 1),
                video_url: format!("https://video.example.com/{}", i + 1),
            })
            .collect()
    }

    pub(crate) fn sample_course(instrument_id: Uuid, lesson_count: usize) -> Course {
        let now = Utc::now();
        Course {
            id: Uuid::new_v4(),
            name: "Sample".to_string(),
            description: String::new(),
            instrument_id,
            creator_id: Uuid::new_v4(),
            lessons: lessons(lesson_count),
            lesson_count,
            created_at: now,
            updated_at: now,
        }
    }

    fn tutor() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "tutor@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn instrument_without_image_gets_placeholder() {
        let db = InMemoryDatabase::new();
        let violin = add_instrument(&db, "Violin", Some("  ")).await.unwrap();
        assert_eq!(violin.image_url, DEFAULT_INSTRUMENT_IMAGE);
        assert_eq!(list_instruments(&db).await.unwrap(), vec![violin]);
    }

    #[tokio::test]
    async fn lesson_count_follows_the_lesson_list() {
        let db = InMemoryDatabase::new();
        let piano = add_instrument(&db, "Piano", None).await.unwrap();
        let author = tutor();

        let course = create_course(
            &db,
            Some(&author),
            CourseDraft {
                name: "Scales".to_string(),
                description: "Major and minor".to_string(),
                instrument_id: piano.id,
                lessons: lessons(3),
            },
        )
        .await
        .unwrap();
        assert_eq!(course.lesson_count, 3);
        assert_eq!(course.creator_id, author.user_id);

        let updated = update_course(
            &db,
            Some(&author),
            course.id,
            CourseDraft {
                name: "Scales".to_string(),
                description: "Major only".to_string(),
                instrument_id: piano.id,
                lessons: lessons(5),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.lesson_count, 5);
        assert_eq!(updated.created_at, course.created_at);

        let listed = list_courses_by_instrument(&db, piano.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].description, "Major only");
    }

    #[tokio::test]
    async fn course_needs_an_existing_instrument() {
        let db = InMemoryDatabase::new();
        let err = create_course(
            &db,
            Some(&tutor()),
            CourseDraft {
                name: "Orphan".to_string(),
                description: String::new(),
                instrument_id: Uuid::new_v4(),
                lessons: Vec::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleted_course_is_not_found() {
        let db = InMemoryDatabase::new();
        let drums = add_instrument(&db, "Drums", None).await.unwrap();
        let author = tutor();
        let course = create_course(
            &db,
            Some(&author),
            CourseDraft {
                name: "Grooves".to_string(),
                description: String::new(),
                instrument_id: drums.id,
                lessons: lessons(1),
            },
        )
        .await
        .unwrap();

        delete_course(&db, Some(&author), course.id).await.unwrap();
        let err = get_course(&db, course.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(list_authored_courses(&db, Some(&author)).await.unwrap().is_empty());
    }
}
