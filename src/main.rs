//! # Fellow Relay
//!
//! Relays messages from a watched Telegram group into its fellow chat.
//!
//! This is the application entry point that initializes:
//! - Configuration loading
//! - Tracing/logging subsystem
//! - Database connection pool
//! - Telegram long polling, dispatch workers, and the admin API

use anyhow::Result;
use tracing::info;

use fellow_relay::config::Settings;
use fellow_relay::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment and config files
    let settings = Settings::load()?;

    fellow_relay::telemetry::init_tracing(&settings.log);

    info!(
        source_group_id = settings.relay.source_group_id,
        workers = settings.dispatch.workers,
        queue_capacity = settings.dispatch.queue_capacity,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Relay ready");
    application.run_until_stopped().await?;

    Ok(())
}
