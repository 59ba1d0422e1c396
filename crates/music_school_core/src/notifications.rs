//! crates/music_school_core/src/notifications.rs
//!
//! Lesson discussion and the tutor alerts it raises.
//!
//! Posting a comment writes the comment first. When the commenter is not the
//! course creator, a notification record is written and an email is handed to the
//! relay on a detached task. Neither side effect can fail the post.

use crate::domain::{Comment, EmailMessage, LessonId, Notification, Session};
use crate::error::{require_session, CoreError, CoreResult};
use crate::ports::{DatabaseService, EmailRelayService};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Characters of the comment quoted in the in-app notification.
pub const NOTIFICATION_EXCERPT_CHARS: usize = 30;

const FALLBACK_COURSE_NAME: &str = "your course";

/// Everything the dispatcher needs to know about a new comment and its course.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub course_id: Uuid,
    pub lesson_id: LessonId,
    pub text: String,
    pub course_creator_id: Option<Uuid>,
    pub course_name: Option<String>,
    pub instructor_email: Option<String>,
}

/// The outcome of [`post_comment`].
#[derive(Debug)]
pub struct CommentPosted {
    pub comment: Comment,
    /// `None` when no alert was due or writing it failed.
    pub notification: Option<Notification>,
    /// The detached email task, if one was started. Dropping it does not cancel it.
    pub email_dispatch: Option<JoinHandle<()>>,
}

pub fn notification_message(course_name: Option<&str>, text: &str) -> String {
    let excerpt: String = text.chars().take(NOTIFICATION_EXCERPT_CHARS).collect();
    format!(
        "New comment in {}: \"{}...\"",
        course_name.unwrap_or(FALLBACK_COURSE_NAME),
        excerpt
    )
}

pub fn comment_email(
    to: &str,
    course_name: Option<&str>,
    commenter_email: &str,
    text: &str,
) -> EmailMessage {
    let course = course_name.unwrap_or(FALLBACK_COURSE_NAME);
    EmailMessage {
        to: to.to_string(),
        subject: format!("New comment on {}", course),
        text: format!(
            "{} left a new comment on {}:\n\n\"{}\"",
            commenter_email, course, text
        ),
        html: format!(
            "<p><strong>{}</strong> left a new comment on <strong>{}</strong>:</p><blockquote>{}</blockquote>",
            escape_html(commenter_email),
            escape_html(course),
            escape_html(text)
        ),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Posts a comment as the signed-in user and notifies the course creator.
pub async fn post_comment(
    db: &dyn DatabaseService,
    relay: Arc<dyn EmailRelayService>,
    session: Option<&Session>,
    request: NewComment,
) -> CoreResult<CommentPosted> {
    let author = require_session(session)?;
    if request.text.trim().is_empty() {
        return Err(CoreError::InvalidInput("Comment text must not be empty".to_string()));
    }

    let comment = Comment {
        id: Uuid::new_v4(),
        course_id: request.course_id,
        lesson_id: request.lesson_id,
        text: request.text,
        author_id: author.user_id,
        author_email: author.email.clone(),
        created_at: Utc::now(),
    };
    db.create_comment(&comment).await?;

    let creator_id = match request.course_creator_id {
        Some(id) if id != author.user_id => id,
        _ => {
            return Ok(CommentPosted {
                comment,
                notification: None,
                email_dispatch: None,
            })
        }
    };

    let course_name = request.course_name.as_deref();
    let notification = Notification {
        id: Uuid::new_v4(),
        recipient_id: creator_id,
        message: notification_message(course_name, &comment.text),
        sender_email: author.email.clone(),
        course_id: comment.course_id,
        read: false,
        created_at: Utc::now(),
    };
    let notification = match db.create_notification(&notification).await {
        Ok(()) => {
            info!("Notification sent to tutor {}", creator_id);
            Some(notification)
        }
        Err(e) => {
            warn!("Failed to write notification for tutor {}: {:?}", creator_id, e);
            None
        }
    };

    let email_dispatch = request.instructor_email.as_deref().map(|to| {
        let message = comment_email(to, course_name, &author.email, &comment.text);
        spawn_email(relay, message)
    });

    Ok(CommentPosted {
        comment,
        notification,
        email_dispatch,
    })
}

fn spawn_email(relay: Arc<dyn EmailRelayService>, message: EmailMessage) -> JoinHandle<()> {
    tokio::spawn(async move {
        match relay.send_email(&message).await {
            Ok(()) => info!("Comment email relayed to {}", message.to),
            Err(e) => warn!("Failed to relay comment email to {}: {}", message.to, e),
        }
    })
}

pub async fn list_comments(
    db: &dyn DatabaseService,
    course_id: Uuid,
    lesson_id: &LessonId,
) -> CoreResult<Vec<Comment>> {
    Ok(db.list_comments(course_id, lesson_id).await?)
}

/// The signed-in user's notifications, newest first.
pub async fn list_notifications(
    db: &dyn DatabaseService,
    session: Option<&Session>,
) -> CoreResult<Vec<Notification>> {
    let session = require_session(session)?;
    Ok(db.list_notifications_for(session.user_id).await?)
}

/// Sets the read flag. Only the recipient may do so; anyone else gets `NotFound`.
pub async fn mark_notification_read(
    db: &dyn DatabaseService,
    session: Option<&Session>,
    notification_id: Uuid,
) -> CoreResult<()> {
    let session = require_session(session)?;
    let notification = db.get_notification(notification_id).await?;
    if notification.recipient_id != session.user_id {
        return Err(CoreError::NotFound(format!(
            "Notification {} not found",
            notification_id
        )));
    }
    if !notification.read {
        db.mark_notification_read(notification_id).await?;
    }
    Ok(())
}
