//! services/api/src/web/comment_feed.rs
//!
//! Live comment subscriptions. A client subscribes to one lesson's discussion
//! over a WebSocket and receives the full newest-first list on subscribe and
//! again whenever a comment is posted to that lesson. Closing the socket ends
//! the subscription.

use crate::web::{
    dto::CommentResponse,
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use music_school_core::{domain::LessonId, notifications, CoreResult, DatabaseService};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Pending change events kept per subscriber before it is reported as lagging.
const FEED_CAPACITY: usize = 256;

/// Identifies one lesson's discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentTopic {
    pub course_id: Uuid,
    pub lesson_id: LessonId,
}

/// Fans out "this thread changed" events to every open feed socket.
pub struct CommentHub {
    sender: broadcast::Sender<CommentTopic>,
}

impl CommentHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Announces a change. Having no listeners is not an error.
    pub fn publish(&self, topic: CommentTopic) {
        let listeners = self.sender.send(topic).unwrap_or(0);
        debug!("Comment change delivered to {} feed listeners", listeners);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CommentTopic> {
        self.sender.subscribe()
    }
}

impl Default for CommentHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads a lesson's comments, flagging the ones written by the course creator.
pub async fn comment_responses(
    db: &dyn DatabaseService,
    course_id: Uuid,
    lesson_id: &LessonId,
    course_creator_id: Option<Uuid>,
) -> CoreResult<Vec<CommentResponse>> {
    Ok(notifications::list_comments(db, course_id, lesson_id)
        .await?
        .into_iter()
        .map(|c| CommentResponse::new(c, course_creator_id))
        .collect())
}

/// GET /ws/comments - upgrades to the live comment feed.
pub async fn comment_feed_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// What the socket loop does next.
#[derive(Debug)]
enum FeedStep {
    /// Send the current comment list for this thread.
    Snapshot(CommentTopic),
    /// Send a reply that is not a snapshot.
    Reply(ServerMessage),
    Idle,
    Close,
}

/// The thread one socket follows, if any.
#[derive(Debug, Default)]
struct FeedSubscription {
    topic: Option<CommentTopic>,
}

impl FeedSubscription {
    /// Handles a text frame from the client. Subscribing replaces any earlier topic.
    fn on_client_text(&mut self, text: &str) -> FeedStep {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Subscribe {
                course_id,
                lesson_id,
            }) => {
                let requested = CommentTopic {
                    course_id,
                    lesson_id: LessonId::from(lesson_id),
                };
                self.topic = Some(requested.clone());
                FeedStep::Snapshot(requested)
            }
            Ok(ClientMessage::Unsubscribe) => {
                self.topic = None;
                FeedStep::Idle
            }
            Err(e) => {
                warn!("Unreadable comment feed message: {}", e);
                FeedStep::Reply(ServerMessage::Error {
                    message: "Expected a subscribe or unsubscribe message.".to_string(),
                })
            }
        }
    }

    /// Handles a change event from the hub.
    fn on_update(&self, update: Result<CommentTopic, RecvError>) -> FeedStep {
        let refresh = match update {
            Ok(changed) => self.topic.as_ref() == Some(&changed),
            // Missed events may include ours; resend to be current.
            Err(RecvError::Lagged(_)) => self.topic.is_some(),
            Err(RecvError::Closed) => return FeedStep::Close,
        };
        match (refresh, &self.topic) {
            (true, Some(current)) => FeedStep::Snapshot(current.clone()),
            _ => FeedStep::Idle,
        }
    }
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New comment feed connection");

    let (mut sender, mut receiver) = socket.split();
    let mut updates = app_state.comment_hub.subscribe();
    let mut subscription = FeedSubscription::default();

    loop {
        let step = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => subscription.on_client_text(text.as_str()),
                Some(Ok(Message::Close(_))) | None => FeedStep::Close,
                Some(Ok(_)) => FeedStep::Idle,
                Some(Err(e)) => {
                    warn!("Comment feed socket error: {}", e);
                    FeedStep::Close
                }
            },
            update = updates.recv() => subscription.on_update(update),
        };

        let sent = match step {
            FeedStep::Snapshot(topic) => {
                let message = snapshot_message(app_state.db.as_ref(), &topic).await;
                send_message(&mut sender, &message).await
            }
            FeedStep::Reply(message) => send_message(&mut sender, &message).await,
            FeedStep::Idle => Ok(()),
            FeedStep::Close => break,
        };
        if sent.is_err() {
            break;
        }
    }

    info!("Comment feed connection closed");
}

/// The newest-first comment list for a thread, or an error frame if it cannot be loaded.
async fn snapshot_message(db: &dyn DatabaseService, topic: &CommentTopic) -> ServerMessage {
    let creator_id = db
        .get_course(topic.course_id)
        .await
        .ok()
        .map(|course| course.creator_id);

    match comment_responses(db, topic.course_id, &topic.lesson_id, creator_id).await {
        Ok(comments) => ServerMessage::Snapshot {
            course_id: topic.course_id,
            lesson_id: topic.lesson_id.to_string(),
            comments,
        },
        Err(e) => {
            warn!("Failed to load comments for feed: {:?}", e);
            ServerMessage::Error {
                message: "Failed to load comments.".to_string(),
            }
        }
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
