//! crates/music_school_core/src/users.rs
//!
//! Account bookkeeping: first-login record creation, tutor profile edits and the
//! admin role toggle.

use crate::domain::{Role, Session, User};
use crate::error::{require_session, CoreError, CoreResult};
use crate::ports::{DatabaseService, PortError};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Returns the user's record, creating it on first sign-in with no role set.
pub async fn ensure_user(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    display_name: Option<&str>,
) -> CoreResult<User> {
    let session = require_session(session)?;
    match db.get_user(session.user_id).await {
        Ok(user) => Ok(user),
        Err(PortError::NotFound(_)) => {
            let user = User {
                id: session.user_id,
                email: session.email.clone(),
                display_name: display_name.map(str::to_string),
                role: None,
                bio: None,
                created_at: Utc::now(),
            };
            db.create_user(&user).await?;
            info!("Created user record for {}", session.email);
            Ok(user)
        }
        Err(e) => Err(e.into()),
    }
}

/// A tutor editing their own public profile. Saving the profile marks the account
/// as a tutor.
pub async fn update_profile(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    display_name: &str,
    bio: &str,
) -> CoreResult<User> {
    let session = require_session(session)?;
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(CoreError::InvalidInput("Display name is required".to_string()));
    }

    db.update_user_profile(session.user_id, display_name, bio.trim(), Role::Tutor)
        .await?;
    Ok(db.get_user(session.user_id).await?)
}

pub async fn list_users(db: &dyn DatabaseService) -> CoreResult<Vec<User>> {
    Ok(db.list_users().await?)
}

/// Flips a tutor back to student and anyone else to tutor. Admins are left alone.
pub async fn toggle_role(db: &dyn DatabaseService, user_id: Uuid) -> CoreResult<Role> {
    let user = db.get_user(user_id).await?;
    let current = user.role.unwrap_or_default();
    let next = match current {
        Role::Admin => return Ok(Role::Admin),
        Role::Tutor => Role::Student,
        Role::Student => Role::Tutor,
    };

    db.update_user_role(user_id, next).await?;
    info!("Changed role of {} from {} to {}", user.email, current, next);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDatabase;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "new@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn first_sign_in_creates_a_roleless_record() {
        let db = InMemoryDatabase::new();
        let s = session();

        let user = ensure_user(&db, Some(&s), Some("New Person")).await.unwrap();
        assert_eq!(user.id, s.user_id);
        assert_eq!(user.role, None);

        let again = ensure_user(&db, Some(&s), Some("Other Name")).await.unwrap();
        assert_eq!(again.display_name.as_deref(), Some("New Person"));
    }

    #[tokio::test]
    async fn toggle_cycles_between_student_and_tutor() {
        let db = InMemoryDatabase::new();
        let s = session();
        ensure_user(&db, Some(&s), None).await.unwrap();

        assert_eq!(toggle_role(&db, s.user_id).await.unwrap(), Role::Tutor);
        assert_eq!(toggle_role(&db, s.user_id).await.unwrap(), Role::Student);
    }

    #[tokio::test]
    async fn admins_are_not_toggled() {
        let db = InMemoryDatabase::new();
        let s = session();
        ensure_user(&db, Some(&s), None).await.unwrap();
        db.update_user_role(s.user_id, Role::Admin).await.unwrap();

        assert_eq!(toggle_role(&db, s.user_id).await.unwrap(), Role::Admin);
        assert_eq!(db.get_user(s.user_id).await.unwrap().role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn profile_update_marks_user_as_tutor() {
        let db = InMemoryDatabase::new();
        let s = session();
        ensure_user(&db, Some(&s), None).await.unwrap();

        let user = update_profile(&db, Some(&s), "  Ana  ", "Jazz pianist").await.unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ana"));
        assert_eq!(user.bio.as_deref(), Some("Jazz pianist"));
        assert_eq!(user.role, Some(Role::Tutor));
    }
}
