//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use music_school_core::domain::{
    Comment, Course, Enrollment, Instrument, Lesson, LessonId, Notification, ProgressRecord,
    Role, User, UserCredentials,
};
use music_school_core::ports::{DatabaseService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, email, display_name, role, bio, created_at";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    role: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        let role = self.role.as_deref().and_then(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!("Ignoring stored role for user {}: {}", self.id, e);
                None
            }
        });
        User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            role,
            bio: self.bio,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: Option<String>,
}

#[derive(FromRow)]
struct InstrumentRecord {
    id: Uuid,
    name: String,
    image_url: String,
}
impl InstrumentRecord {
    fn to_domain(self) -> Instrument {
        Instrument {
            id: self.id,
            name: self.name,
            image_url: self.image_url,
        }
    }
}

/// A lesson as stored inside the course's `lessons` JSON column.
#[derive(Serialize, Deserialize)]
struct LessonRecord {
    id: String,
    name: String,
    video_url: String,
}

const COURSE_COLUMNS: &str =
    "id, name, description, instrument_id, creator_id, lessons, lesson_count, created_at, updated_at";

#[derive(FromRow)]
struct CourseRecord {
    id: Uuid,
    name: String,
    description: String,
    instrument_id: Uuid,
    creator_id: Uuid,
    lessons: Json<Vec<LessonRecord>>,
    lesson_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl CourseRecord {
    fn to_domain(self) -> Course {
        Course {
            id: self.id,
            name: self.name,
            description: self.description,
            instrument_id: self.instrument_id,
            creator_id: self.creator_id,
            lessons: self
                .lessons
                .0
                .into_iter()
                .map(|l| Lesson {
                    id: LessonId::from(l.id),
                    name: l.name,
                    video_url: l.video_url,
                })
                .collect(),
            lesson_count: self.lesson_count.max(0) as usize,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn lesson_records(course: &Course) -> Json<Vec<LessonRecord>> {
    Json(
        course
            .lessons
            .iter()
            .map(|l| LessonRecord {
                id: l.id.to_string(),
                name: l.name.clone(),
                video_url: l.video_url.clone(),
            })
            .collect(),
    )
}

#[derive(FromRow)]
struct EnrollmentRecord {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    enrolled_at: DateTime<Utc>,
}
impl EnrollmentRecord {
    fn to_domain(self) -> Enrollment {
        Enrollment {
            id: self.id,
            user_id: self.user_id,
            course_id: self.course_id,
            enrolled_at: self.enrolled_at,
        }
    }
}

#[derive(FromRow)]
struct ProgressRow {
    user_id: Uuid,
    course_id: Uuid,
    completed_lessons: Vec<String>,
    progress_percentage: i16,
}
impl ProgressRow {
    fn to_domain(self) -> ProgressRecord {
        ProgressRecord {
            user_id: self.user_id,
            course_id: self.course_id,
            completed_lessons: self.completed_lessons.into_iter().map(LessonId::from).collect(),
            progress_percentage: self.progress_percentage.clamp(0, 100) as u8,
        }
    }
}

#[derive(FromRow)]
struct CommentRecord {
    id: Uuid,
    course_id: Uuid,
    lesson_id: String,
    text: String,
    author_id: Uuid,
    author_email: String,
    created_at: DateTime<Utc>,
}
impl CommentRecord {
    fn to_domain(self) -> Comment {
        Comment {
            id: self.id,
            course_id: self.course_id,
            lesson_id: LessonId::from(self.lesson_id),
            text: self.text,
            author_id: self.author_id,
            author_email: self.author_email,
            created_at: self.created_at,
        }
    }
}

const NOTIFICATION_COLUMNS: &str =
    "id, recipient_id, message, sender_email, course_id, read, created_at";

#[derive(FromRow)]
struct NotificationRecord {
    id: Uuid,
    recipient_id: Uuid,
    message: String,
    sender_email: String,
    course_id: Uuid,
    read: bool,
    created_at: DateTime<Utc>,
}
impl NotificationRecord {
    fn to_domain(self) -> Notification {
        Notification {
            id: self.id,
            recipient_id: self.recipient_id,
            message: self.message,
            sender_email: self.sender_email,
            course_id: self.course_id,
            read: self.read,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- User Management ---
    async fn create_user(&self, user: &User) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, display_name, role, bio, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role.map(|r| r.as_str()))
        .bind(&user.bio)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users ORDER BY email ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_user_role(&self, user_id: Uuid, role: Role) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
        bio: &str,
        role: Role,
    ) -> PortResult<()> {
        let result =
            sqlx::query("UPDATE users SET display_name = $1, bio = $2, role = $3 WHERE id = $4")
                .bind(display_name)
                .bind(bio)
                .bind(role.as_str())
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, email, display_name, hashed_password) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(display_name)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("User {} not found", email)))?;

        let hashed_password = record
            .hashed_password
            .ok_or_else(|| PortError::NotFound(format!("No password set for {}", email)))?;
        Ok(UserCredentials {
            user_id: record.id,
            email: record.email,
            hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Instruments ---
    async fn list_instruments(&self) -> PortResult<Vec<Instrument>> {
        let records = sqlx::query_as::<_, InstrumentRecord>(
            "SELECT id, name, image_url FROM instruments ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_instrument(&self, instrument_id: Uuid) -> PortResult<Instrument> {
        let record = sqlx::query_as::<_, InstrumentRecord>(
            "SELECT id, name, image_url FROM instruments WHERE id = $1",
        )
        .bind(instrument_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Instrument {} not found", instrument_id)))?;
        Ok(record.to_domain())
    }

    async fn create_instrument(&self, instrument: &Instrument) -> PortResult<()> {
        sqlx::query("INSERT INTO instruments (id, name, image_url) VALUES ($1, $2, $3)")
            .bind(instrument.id)
            .bind(&instrument.name)
            .bind(&instrument.image_url)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_instrument(&self, instrument_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM instruments WHERE id = $1")
            .bind(instrument_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Courses ---
    async fn get_course(&self, course_id: Uuid) -> PortResult<Course> {
        let record = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Course {} not found", course_id)))?;
        Ok(record.to_domain())
    }

    async fn list_courses_by_instrument(&self, instrument_id: Uuid) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {} FROM courses WHERE instrument_id = $1 ORDER BY created_at ASC",
            COURSE_COLUMNS
        ))
        .bind(instrument_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_courses_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {} FROM courses WHERE creator_id = $1 ORDER BY created_at ASC",
            COURSE_COLUMNS
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_course(&self, course: &Course) -> PortResult<()> {
        sqlx::query(&format!(
            "INSERT INTO courses ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            COURSE_COLUMNS
        ))
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.instrument_id)
        .bind(course.creator_id)
        .bind(lesson_records(course))
        .bind(course.lesson_count as i32)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update_course(&self, course: &Course) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE courses SET name = $1, description = $2, instrument_id = $3, creator_id = $4, \
             lessons = $5, lesson_count = $6, updated_at = $7 WHERE id = $8",
        )
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.instrument_id)
        .bind(course.creator_id)
        .bind(lesson_records(course))
        .bind(course.lesson_count as i32)
        .bind(course.updated_at)
        .bind(course.id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Course {} not found", course.id)));
        }
        Ok(())
    }

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Enrollments ---
    async fn find_enrollments(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Vec<Enrollment>> {
        let records = sqlx::query_as::<_, EnrollmentRecord>(
            "SELECT id, user_id, course_id, enrolled_at FROM enrollments \
             WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_enrollments_for_user(&self, user_id: Uuid) -> PortResult<Vec<Enrollment>> {
        let records = sqlx::query_as::<_, EnrollmentRecord>(
            "SELECT id, user_id, course_id, enrolled_at FROM enrollments \
             WHERE user_id = $1 ORDER BY enrolled_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_enrollment(&self, enrollment: &Enrollment) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO enrollments (id, user_id, course_id, enrolled_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(enrollment.id)
        .bind(enrollment.user_id)
        .bind(enrollment.course_id)
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    // --- Progress ---
    async fn get_progress(&self, key: &str) -> PortResult<Option<ProgressRecord>> {
        let row = sqlx::query_as::<_, ProgressRow>(
            "SELECT user_id, course_id, completed_lessons, progress_percentage \
             FROM user_progress WHERE id = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(row.map(|r| r.to_domain()))
    }

    async fn save_progress(&self, record: &ProgressRecord) -> PortResult<()> {
        let completed: Vec<String> = record
            .completed_lessons
            .iter()
            .map(|l| l.to_string())
            .collect();
        sqlx::query(
            "INSERT INTO user_progress (id, user_id, course_id, completed_lessons, progress_percentage) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET completed_lessons = EXCLUDED.completed_lessons, \
             progress_percentage = EXCLUDED.progress_percentage",
        )
        .bind(record.key())
        .bind(record.user_id)
        .bind(record.course_id)
        .bind(completed)
        .bind(record.progress_percentage as i16)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_progress_for_courses(
        &self,
        user_id: Uuid,
        course_ids: &[Uuid],
    ) -> PortResult<Vec<ProgressRecord>> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            "SELECT user_id, course_id, completed_lessons, progress_percentage \
             FROM user_progress WHERE user_id = $1 AND course_id = ANY($2)",
        )
        .bind(user_id)
        .bind(course_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }

    // --- Comments ---
    async fn create_comment(&self, comment: &Comment) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO comments (id, course_id, lesson_id, text, author_id, author_email, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(comment.id)
        .bind(comment.course_id)
        .bind(comment.lesson_id.as_str())
        .bind(&comment.text)
        .bind(comment.author_id)
        .bind(&comment.author_email)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_comments(&self, course_id: Uuid, lesson_id: &LessonId) -> PortResult<Vec<Comment>> {
        let records = sqlx::query_as::<_, CommentRecord>(
            "SELECT id, course_id, lesson_id, text, author_id, author_email, created_at \
             FROM comments WHERE course_id = $1 AND lesson_id = $2 ORDER BY created_at DESC",
        )
        .bind(course_id)
        .bind(lesson_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    // --- Notifications ---
    async fn create_notification(&self, notification: &Notification) -> PortResult<()> {
        sqlx::query(&format!(
            "INSERT INTO notifications ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            NOTIFICATION_COLUMNS
        ))
        .bind(notification.id)
        .bind(notification.recipient_id)
        .bind(&notification.message)
        .bind(&notification.sender_email)
        .bind(notification.course_id)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification> {
        let record = sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {} FROM notifications WHERE id = $1",
            NOTIFICATION_COLUMNS
        ))
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Notification {} not found", notification_id)))?;
        Ok(record.to_domain())
    }

    async fn list_notifications_for(&self, recipient_id: Uuid) -> PortResult<Vec<Notification>> {
        let records = sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {} FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Notification {} not found",
                notification_id
            )));
        }
        Ok(())
    }
}
