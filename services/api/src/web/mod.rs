pub mod account;
pub mod auth;
pub mod catalog;
pub mod comment_feed;
pub mod discussion;
pub mod dto;
pub mod learning;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

// Re-export what the binary needs to assemble the server.
pub use rest::{build_router, ApiDoc};
pub use state::AppState;
