//! crates/music_school_core/src/navigation.rs
//!
//! Decides which parts of the UI a user is offered. This is presentation only:
//! nothing here restricts what the store will accept.

use crate::domain::Role;
use crate::error::CoreResult;
use crate::ports::{DatabaseService, PortError};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub role: Role,
    pub show_admin_panel: bool,
    pub show_course_authoring: bool,
    pub show_notifications: bool,
}

/// The user's role, falling back to `Student` when the record has none.
///
/// A user with no record at all is also treated as a student.
pub async fn resolve_role(db: &dyn DatabaseService, user_id: Uuid) -> CoreResult<Role> {
    match db.get_user(user_id).await {
        Ok(user) => Ok(user.role.unwrap_or_default()),
        Err(PortError::NotFound(_)) => {
            debug!("No user record for {}, defaulting to student", user_id);
            Ok(Role::Student)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn navigation_for(role: Role) -> Navigation {
    Navigation {
        role,
        show_admin_panel: role == Role::Admin,
        show_course_authoring: role == Role::Tutor,
        show_notifications: role == Role::Tutor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::memory::InMemoryDatabase;
    use chrono::Utc;

    fn user(role: Option<Role>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            display_name: None,
            role,
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_role_resolves_to_student() {
        let db = InMemoryDatabase::new();
        let u = user(None);
        db.create_user(&u).await.unwrap();

        assert_eq!(resolve_role(&db, u.id).await.unwrap(), Role::Student);
    }

    #[tokio::test]
    async fn stored_role_is_returned() {
        let db = InMemoryDatabase::new();
        let u = user(Some(Role::Admin));
        db.create_user(&u).await.unwrap();

        assert_eq!(resolve_role(&db, u.id).await.unwrap(), Role::Admin);
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_student() {
        let db = InMemoryDatabase::new();
        assert_eq!(resolve_role(&db, Uuid::new_v4()).await.unwrap(), Role::Student);
    }

    #[test]
    fn affordances_follow_role() {
        let student = navigation_for(Role::Student);
        assert!(!student.show_admin_panel && !student.show_course_authoring);

        let tutor = navigation_for(Role::Tutor);
        assert!(tutor.show_course_authoring && tutor.show_notifications);
        assert!(!tutor.show_admin_panel);

        let admin = navigation_for(Role::Admin);
        assert!(admin.show_admin_panel);
        assert!(!admin.show_course_authoring);
    }
}
