//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol of the live comment feed.

use crate::web::dto::CommentResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts following one lesson's discussion, replacing any previous subscription.
    Subscribe {
        course_id: Uuid,
        lesson_id: String,
    },

    /// Stops receiving snapshots without closing the socket.
    Unsubscribe,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full comment list for the subscribed lesson, newest first.
    Snapshot {
        course_id: Uuid,
        lesson_id: String,
        comments: Vec<CommentResponse>,
    },

    /// Reports a problem with the last client message or with loading comments.
    Error { message: String },
}
