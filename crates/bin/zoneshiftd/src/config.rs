//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `zoneshiftd.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use zoneshift_app::dispatcher::DispatchConfig;
use zoneshift_app::engine::EngineConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event socket settings.
    pub socket: SocketConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Rule-set document settings.
    pub rules: RulesConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Dispatcher retry/timeout policy.
    pub dispatch: DispatchSettings,
    /// Named action executors.
    pub actions: Vec<ActionConfig>,
}

/// Unix domain socket listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Filesystem path of the event socket.
    pub path: String,
    /// Source label for events that do not carry one.
    pub default_source: String,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Rule-set document location.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Path to the JSON rule-set document.
    pub path: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Dispatcher policy knobs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Attempts per action before it counts as failed.
    pub max_attempts: u32,
    /// Base backoff between attempts, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Per-attempt timeout, in seconds.
    pub action_timeout_secs: u64,
    /// Command queue bound.
    pub queue_capacity: usize,
}

/// One named action executor.
#[derive(Debug, Deserialize)]
pub struct ActionConfig {
    /// Action name rules refer to; must be unique.
    pub name: String,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// Executor flavor for a configured action.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionKind {
    /// Log-only placeholder; always succeeds.
    Log,
    /// External program, argv style.
    Command {
        execute: Vec<String>,
        #[serde(default)]
        rollback: Option<Vec<String>>,
    },
}

impl Config {
    /// Load configuration from `zoneshiftd.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("zoneshiftd.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ZONESHIFT_SOCKET") {
            self.socket.path = val;
        }
        if let Ok(val) = std::env::var("ZONESHIFT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("ZONESHIFT_RULES") {
            self.rules.path = val;
        }
        if let Ok(val) = std::env::var("ZONESHIFT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "dispatch.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "dispatch.queue_capacity must be non-zero".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for action in &self.actions {
            if action.name.is_empty() {
                return Err(ConfigError::Validation(
                    "action name must not be empty".to_string(),
                ));
            }
            if !seen.insert(action.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate action name `{}`",
                    action.name
                )));
            }
        }
        Ok(())
    }

    /// Engine parameters derived from the dispatch section.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            queue_capacity: self.dispatch.queue_capacity,
            dispatch: DispatchConfig {
                max_attempts: self.dispatch.max_attempts,
                retry_backoff: Duration::from_millis(self.dispatch.retry_backoff_ms),
                action_timeout: Duration::from_secs(self.dispatch.action_timeout_secs),
            },
        }
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            path: "/var/run/zoneshiftd.sock".to_string(),
            default_source: "socket".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:zoneshift.db?mode=rwc".to_string(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: "rules.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "zoneshiftd=info,zoneshift=info".to_string(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 200,
            action_timeout_secs: 10,
            queue_capacity: 256,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
