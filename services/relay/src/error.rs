//! services/relay/src/error.rs

use crate::config::ConfigError;

/// Failures that stop the relay from starting.
#[derive(Debug, thiserror::Error)]
pub enum RelayServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("SMTP setup error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single message could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("Failed to send email: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
