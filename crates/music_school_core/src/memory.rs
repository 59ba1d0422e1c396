//! crates/music_school_core/src/memory.rs
//!
//! An in-memory implementation of the `DatabaseService` port. Used for local
//! development when no `DATABASE_URL` is configured, and by the test suites.

use crate::domain::{
    Comment, Course, Enrollment, Instrument, LessonId, Notification, ProgressRecord, Role,
    User, UserCredentials,
};
use crate::ports::{DatabaseService, PortError, PortResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    passwords: HashMap<Uuid, String>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    instruments: HashMap<Uuid, Instrument>,
    courses: HashMap<Uuid, Course>,
    enrollments: Vec<Enrollment>,
    progress: HashMap<String, ProgressRecord>,
    comments: Vec<Comment>,
    notifications: HashMap<Uuid, Notification>,
}

/// Every collection behind one lock; each port call reads or writes once, so
/// callers see the same non-transactional behaviour as the hosted store.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PortResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> PortResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }

    /// Number of enrollment documents for the pair, duplicates included.
    pub fn enrollment_count(&self, user_id: Uuid, course_id: Uuid) -> usize {
        self.read()
            .map(|t| {
                t.enrollments
                    .iter()
                    .filter(|e| e.user_id == user_id && e.course_id == course_id)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn notification_count(&self) -> usize {
        self.read().map(|t| t.notifications.len()).unwrap_or(0)
    }

    pub fn comment_count(&self) -> usize {
        self.read().map(|t| t.comments.len()).unwrap_or(0)
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn create_user(&self, user: &User) -> PortResult<()> {
        let mut t = self.write()?;
        t.users.entry(user.id).or_insert_with(|| user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        self.read()?
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn update_user_role(&self, user_id: Uuid, role: Role) -> PortResult<()> {
        let mut t = self.write()?;
        let user = t
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.role = Some(role);
        Ok(())
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        display_name: &str,
        bio: &str,
        role: Role,
    ) -> PortResult<()> {
        let mut t = self.write()?;
        let user = t
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.display_name = Some(display_name.to_string());
        user.bio = Some(bio.to_string());
        user.role = Some(role);
        Ok(())
    }

    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let mut t = self.write()?;
        if t.users.values().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(PortError::Unexpected(format!(
                "An account for {} already exists",
                email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            role: None,
            bio: None,
            created_at: Utc::now(),
        };
        t.passwords.insert(user.id, hashed_password.to_string());
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let t = self.read()?;
        let user = t
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?;
        let hashed_password = t
            .passwords
            .get(&user.id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("No password set for {}", email)))?;
        Ok(UserCredentials {
            user_id: user.id,
            email: user.email.clone(),
            hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.write()?
            .auth_sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match self.read()?.auth_sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.write()?.auth_sessions.remove(session_id);
        Ok(())
    }

    async fn list_instruments(&self) -> PortResult<Vec<Instrument>> {
        let mut instruments: Vec<Instrument> =
            self.read()?.instruments.values().cloned().collect();
        instruments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(instruments)
    }

    async fn get_instrument(&self, instrument_id: Uuid) -> PortResult<Instrument> {
        self.read()?
            .instruments
            .get(&instrument_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Instrument {} not found", instrument_id)))
    }

    async fn create_instrument(&self, instrument: &Instrument) -> PortResult<()> {
        self.write()?
            .instruments
            .insert(instrument.id, instrument.clone());
        Ok(())
    }

    async fn delete_instrument(&self, instrument_id: Uuid) -> PortResult<()> {
        self.write()?.instruments.remove(&instrument_id);
        Ok(())
    }

    async fn get_course(&self, course_id: Uuid) -> PortResult<Course> {
        self.read()?
            .courses
            .get(&course_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))
    }

    async fn list_courses_by_instrument(&self, instrument_id: Uuid) -> PortResult<Vec<Course>> {
        let mut courses: Vec<Course> = self
            .read()?
            .courses
            .values()
            .filter(|c| c.instrument_id == instrument_id)
            .cloned()
            .collect();
        courses.sort_by_key(|c| c.created_at);
        Ok(courses)
    }

    async fn list_courses_by_creator(&self, creator_id: Uuid) -> PortResult<Vec<Course>> {
        let mut courses: Vec<Course> = self
            .read()?
            .courses
            .values()
            .filter(|c| c.creator_id == creator_id)
            .cloned()
            .collect();
        courses.sort_by_key(|c| c.created_at);
        Ok(courses)
    }

    async fn create_course(&self, course: &Course) -> PortResult<()> {
        self.write()?.courses.insert(course.id, course.clone());
        Ok(())
    }

    async fn update_course(&self, course: &Course) -> PortResult<()> {
        let mut t = self.write()?;
        let existing = t
            .courses
            .get_mut(&course.id)
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course.id)))?;
        *existing = course.clone();
        Ok(())
    }

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        self.write()?.courses.remove(&course_id);
        Ok(())
    }

    async fn find_enrollments(&self, user_id: Uuid, course_id: Uuid) -> PortResult<Vec<Enrollment>> {
        Ok(self
            .read()?
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn list_enrollments_for_user(&self, user_id: Uuid) -> PortResult<Vec<Enrollment>> {
        Ok(self
            .read()?
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_enrollment(&self, enrollment: &Enrollment) -> PortResult<()> {
        self.write()?.enrollments.push(enrollment.clone());
        Ok(())
    }

    async fn get_progress(&self, key: &str) -> PortResult<Option<ProgressRecord>> {
        Ok(self.read()?.progress.get(key).cloned())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> PortResult<()> {
        self.write()?.progress.insert(record.key(), record.clone());
        Ok(())
    }

    async fn list_progress_for_courses(
        &self,
        user_id: Uuid,
        course_ids: &[Uuid],
    ) -> PortResult<Vec<ProgressRecord>> {
        Ok(self
            .read()?
            .progress
            .values()
            .filter(|p| p.user_id == user_id && course_ids.contains(&p.course_id))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: &Comment) -> PortResult<()> {
        self.write()?.comments.push(comment.clone());
        Ok(())
    }

    async fn list_comments(&self, course_id: Uuid, lesson_id: &LessonId) -> PortResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .read()?
            .comments
            .iter()
            .filter(|c| c.course_id == course_id && &c.lesson_id == lesson_id)
            .cloned()
            .collect();
        newest_first(&mut comments, |c| c.created_at);
        Ok(comments)
    }

    async fn create_notification(&self, notification: &Notification) -> PortResult<()> {
        self.write()?
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn get_notification(&self, notification_id: Uuid) -> PortResult<Notification> {
        self.read()?
            .notifications
            .get(&notification_id)
            .cloned()
            .ok_or_else(|| {
                PortError::NotFound(format!("Notification {} not found", notification_id))
            })
    }

    async fn list_notifications_for(&self, recipient_id: Uuid) -> PortResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .read()?
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        newest_first(&mut notifications, |n| n.created_at);
        Ok(notifications)
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> PortResult<()> {
        let mut t = self.write()?;
        let notification = t.notifications.get_mut(&notification_id).ok_or_else(|| {
            PortError::NotFound(format!("Notification {} not found", notification_id))
        })?;
        notification.read = true;
        Ok(())
    }
}
