//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Admin HTTP server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Telegram Bot API connection
    pub telegram: TelegramSettings,

    /// Which source group is watched
    pub relay: RelaySettings,

    /// Dispatch pool sizing
    pub dispatch: DispatchSettings,

    /// Fellow chat service (destination gateway)
    pub fellow: FellowSettings,

    /// Log output
    pub log: LogSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Admin server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    /// Bot token obtained from @BotFather
    pub token: String,

    /// Base URL of the Bot API
    pub api_url: String,

    /// Long-poll timeout passed to `getUpdates`, in seconds
    pub poll_timeout_secs: u64,
}

/// Relay source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    /// Identity of the single watched source group
    pub source_group_id: i64,
}

/// Dispatch pool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchSettings {
    /// Number of concurrent delivery workers (must be positive)
    pub workers: usize,

    /// Bounded queue capacity (must be positive)
    pub queue_capacity: usize,
}

/// Fellow chat service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FellowSettings {
    /// Base URL of the fellow chat HTTP API
    pub base_url: String,

    /// Optional bearer token for the fellow chat API
    pub api_token: Option<String>,

    /// Handles added to every auto-created fellow chat
    pub members: Vec<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// "pretty" or "json"
    pub format: String,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the dispatch pool sizing is not positive.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("telegram.api_url", "https://api.telegram.org")?
            .set_default("telegram.poll_timeout_secs", 30)?
            .set_default("dispatch.workers", 4)?
            .set_default("dispatch.queue_capacity", 256)?
            .set_default("fellow.members", Vec::<String>::new())?
            .set_default("fellow.request_timeout_secs", 10)?
            .set_default("log.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__DISPATCH__WORKERS=8 -> dispatch.workers = 8
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("fellow.members")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("telegram.token", std::env::var("TELEGRAM_TOKEN").ok())?
            .set_override_option(
                "relay.source_group_id",
                std::env::var("SOURCE_GROUP_ID").ok(),
            )?
            .set_override_option("fellow.base_url", std::env::var("FELLOW_API_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.workers == 0 {
            return Err(ConfigError::Message(
                "dispatch.workers must be a positive integer".into(),
            ));
        }
        if self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::Message(
                "dispatch.queue_capacity must be a positive integer".into(),
            ));
        }
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::Message("telegram.token must be set".into()));
        }
        Ok(())
    }

    /// Get the full admin server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
