//! Configuration parsed from environment variables.
//!
//! Every knob has a typed default; a malformed value falls back to the
//! default rather than failing startup. Intervals, pool size and history
//! depth must also be positive: zero falls back too. Only `DATABASE_URL` is required,
//! and only by the binary.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use tracing::warn;

use crate::consts::{
    DEFAULT_COMMAND_ERROR_DISPLAY_MS, DEFAULT_HISTORY_DEPTH, DEFAULT_PASTE_OFFSET, DEFAULT_PERSIST_DEBOUNCE_MS,
    DEFAULT_PERSIST_POLL_MS,
};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingVar(_) => "E_CONFIG_MISSING",
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset or invalid.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Like [`env_parse`], but a zero or negative value also falls back to `default`.
pub fn env_positive<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + PartialOrd + Default,
{
    let value = env_parse(key, default);
    if value > T::default() {
        value
    } else {
        warn!(key, "config: value must be positive; using default");
        default
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

// =============================================================================
// BOARD SETTINGS
// =============================================================================

/// Per-board tuning handed to the board container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSettings {
    /// Quiet period before a debounced write fires.
    pub persist_debounce: Duration,
    /// Maximum undo depth.
    pub history_depth: usize,
    /// Offset step applied per paste.
    pub paste_offset: f64,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            persist_debounce: Duration::from_millis(DEFAULT_PERSIST_DEBOUNCE_MS),
            history_depth: DEFAULT_HISTORY_DEPTH,
            paste_offset: DEFAULT_PASTE_OFFSET,
        }
    }
}

impl BoardSettings {
    /// - `BOARD_PERSIST_DEBOUNCE_MS`: default 600
    /// - `BOARD_HISTORY_DEPTH`: default 100, must be positive
    /// - `BOARD_PASTE_OFFSET`: default 20
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            persist_debounce: Duration::from_millis(env_parse("BOARD_PERSIST_DEBOUNCE_MS", DEFAULT_PERSIST_DEBOUNCE_MS)),
            history_depth: env_positive("BOARD_HISTORY_DEPTH", DEFAULT_HISTORY_DEPTH),
            paste_offset: env_parse("BOARD_PASTE_OFFSET", DEFAULT_PASTE_OFFSET),
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Wake interval of the persistence task.
    pub persist_poll: Duration,
    /// How long a failed command message stays visible.
    pub command_error_display: Duration,
    pub board: BoardSettings,
}

impl AppConfig {
    /// - `DATABASE_URL`: Postgres connection string
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `BOARD_PERSIST_POLL_MS`: default 50, must be positive
    /// - `COMMAND_ERROR_DISPLAY_MS`: default 4000
    /// - plus everything read by [`BoardSettings::from_env`]
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: non_empty_var("DATABASE_URL"),
            db_max_connections: env_positive("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            persist_poll: Duration::from_millis(env_positive("BOARD_PERSIST_POLL_MS", DEFAULT_PERSIST_POLL_MS)),
            command_error_display: Duration::from_millis(env_positive(
                "COMMAND_ERROR_DISPLAY_MS",
                DEFAULT_COMMAND_ERROR_DISPLAY_MS,
            )),
            board: BoardSettings::from_env(),
        }
    }

    /// The configured database URL.
    ///
    /// # Errors
    ///
    /// Returns `MissingVar` when `DATABASE_URL` is unset or empty.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".into()))
    }
}
