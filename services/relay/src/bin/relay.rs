//! services/relay/src/bin/relay.rs

use relay_lib::{
    config::RelayConfig, error::RelayServiceError, mailer::SmtpMailer, web::build_router,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), RelayServiceError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = RelayConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- 2. Build the Mailer and Router ---
    let mailer = Arc::new(SmtpMailer::new(&config)?);
    let app = build_router(mailer);

    // --- 3. Start the Server ---
    info!("Email relay running on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
