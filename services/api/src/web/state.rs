//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::comment_feed::CommentHub;
use music_school_core::ports::{DatabaseService, EmailRelayService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub relay: Arc<dyn EmailRelayService>,
    pub config: Arc<Config>,
    pub comment_hub: Arc<CommentHub>,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        relay: Arc<dyn EmailRelayService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            db,
            relay,
            config,
            comment_hub: Arc::new(CommentHub::new()),
        }
    }
}
