//! Layered application configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `WORKSHOP__`-prefixed environment variables (`__` separates nesting, so
//! `WORKSHOP__COMMENTS__MIN_CHARS=12` sets `comments.min_chars`).

use crate::task::domain::CommentPolicy;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WORKSHOP";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkshopConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Comment length limits.
    pub comments: CommentsConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
    /// Error report notifications.
    pub error_reporting: ErrorReportingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/workshop".to_owned(),
            max_connections: 10,
        }
    }
}

/// Comment length limits.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommentsConfig {
    /// Minimum characters after trimming.
    pub min_chars: usize,
    /// Maximum characters after trimming.
    pub max_chars: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        let policy = CommentPolicy::default();
        Self {
            min_chars: policy.min_chars,
            max_chars: policy.max_chars,
        }
    }
}

impl CommentsConfig {
    /// Returns the domain policy for these limits.
    #[must_use]
    pub const fn policy(&self) -> CommentPolicy {
        CommentPolicy {
            min_chars: self.min_chars,
            max_chars: self.max_chars,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info,workshop=debug`.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Error report notification settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ErrorReportingConfig {
    /// Admin email addresses notified of internal errors. Empty disables
    /// notifications; errors are still recorded.
    pub admin_recipients: Vec<String>,
    /// Seconds during which a repeated error fingerprint is not re-notified.
    pub notify_cooldown_secs: u64,
}

impl Default for ErrorReportingConfig {
    fn default() -> Self {
        Self {
            admin_recipients: Vec::new(),
            notify_cooldown_secs: 900,
        }
    }
}

impl ErrorReportingConfig {
    /// Returns the cooldown as a [`Duration`].
    #[must_use]
    pub const fn notify_cooldown(&self) -> Duration {
        Duration::from_secs(self.notify_cooldown_secs)
    }
}

impl WorkshopConfig {
    /// Loads defaults, the optional TOML file at `path`, then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source cannot be read or parsed
    /// and [`ConfigError::Invalid`] when validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = path {
            builder = builder.add_source(File::from(file).format(FileFormat::Toml).required(true));
        }
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("error_reporting.admin_recipients")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on parse or validation failure.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the comment limits are
    /// inconsistent or the pool size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.comments.max_chars == 0 {
            return Err(ConfigError::Invalid(
                "comments.max_chars must be greater than zero".to_owned(),
            ));
        }
        if self.comments.min_chars > self.comments.max_chars {
            return Err(ConfigError::Invalid(format!(
                "comments.min_chars ({}) exceeds comments.max_chars ({})",
                self.comments.min_chars, self.comments.max_chars
            )));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
