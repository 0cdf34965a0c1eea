//! Configuration loader for the `krishi-dashboard` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Base URL of the realtime database holding the sensor feed.
    pub feed_database_url: String,

    /// Path under which devices push sensor records.
    pub feed_path: String,

    /// Database auth token appended to the stream URL, if the rules need one.
    pub feed_auth_token: Option<String>,

    /// Port the dashboard HTTP API listens on.
    pub listen_port: u16,

    /// Capacity of the queue between the feed and the dashboard writer.
    pub event_queue_depth: usize,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `FEED_DATABASE_URL` – realtime database base URL
///
/// Optional:
/// - `FEED_PATH` – feed path (default: `sensorData`)
/// - `FEED_AUTH_TOKEN` – database auth token (default: none)
/// - `LISTEN_PORT` – HTTP port (default: 8080)
/// - `EVENT_QUEUE_DEPTH` – feed to dashboard queue capacity (default: 64)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let feed_database_url = require_env!("FEED_DATABASE_URL");
    let feed_path = env::var("FEED_PATH").unwrap_or_else(|_| "sensorData".to_string());
    let feed_auth_token = env::var("FEED_AUTH_TOKEN").ok().filter(|t| !t.is_empty());
    let listen_port = parse_env_u32!("LISTEN_PORT", 8080);
    let event_queue_depth = parse_env_u32!("EVENT_QUEUE_DEPTH", 64);

    let listen_port = u16::try_from(listen_port)
        .map_err(|_| anyhow!("Invalid LISTEN_PORT: {} is out of range", listen_port))?;
    if event_queue_depth == 0 {
        return Err(anyhow!("Invalid EVENT_QUEUE_DEPTH: must be at least 1"));
    }

    Ok(Config {
        feed_database_url,
        feed_path,
        feed_auth_token,
        listen_port,
        event_queue_depth: event_queue_depth as usize,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the auth token while showing all other values that were loaded.
    pub fn log_config(&self) {
        // ---
        let masked_token = match &self.feed_auth_token {
            Some(token) if token.chars().count() > 4 => {
                let tail: String = token.chars().skip(token.chars().count() - 4).collect();
                format!("****{tail}")
            }
            Some(_) => "****".to_string(),
            None => "(none)".to_string(),
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  FEED_DATABASE_URL : {}", self.feed_database_url);
        tracing::info!("  FEED_PATH         : {}", self.feed_path);
        tracing::info!("  FEED_AUTH_TOKEN   : {}", masked_token);
        tracing::info!("  LISTEN_PORT       : {}", self.listen_port);
        tracing::info!("  EVENT_QUEUE_DEPTH : {}", self.event_queue_depth);
    }
}
