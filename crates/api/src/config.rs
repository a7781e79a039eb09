//! Application Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `egommerce.toml` (path from `EGOMMERCE_CONFIG`), then environment variables
//! such as `EGOMMERCE__SERVER__ADDR` or `EGOMMERCE__DATABASE__URL`.

use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable lines for local development
    Text,
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `development` switches logging to text output
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    /// Upper bound on a request, in seconds
    pub read_header_timeout_secs: u64,
    /// Requests per minute per client IP; 0 disables rate limiting
    pub rate_limit_per_minute: u32,
}

/// Database settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Explicit format; derived from the environment when unset
    pub format: Option<LogFormat>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:4000".to_string(),
            read_header_timeout_secs: 10,
            rate_limit_per_minute: 10,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.read_header_timeout_secs)
    }
}

impl AppConfig {
    /// Load from defaults, the optional config file, and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("EGOMMERCE_CONFIG").unwrap_or_else(|_| "egommerce".to_string());

        let settings = config::Config::builder()
            .set_default("environment", "production")?
            .set_default("server.addr", "0.0.0.0:4000")?
            .set_default("server.read_header_timeout_secs", 10)?
            .set_default("server.rate_limit_per_minute", 10)?
            .set_default("database.url", "sqlite://egommerce.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("EGOMMERCE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::Invalid("server.addr is empty".to_string()));
        }
        if self.server.read_header_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.read_header_timeout_secs must be positive".to_string(),
            ));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Configured format, else text in development and JSON elsewhere
    pub fn log_format(&self) -> LogFormat {
        match self.logging.format {
            Some(format) => format,
            None if self.is_development() => LogFormat::Text,
            None => LogFormat::Json,
        }
    }
}
