//! # Configuration
//!
//! Service settings: listener, short-URL base, database pool, URL expiry
//! horizon, read cache sizing and token collision retries.
//!
//! Settings are layered with the `config` crate:
//! 1. built-in defaults ([`Config::default`])
//! 2. an optional `shortlink.toml` (or `.yaml`/`.json`) in the working directory
//! 3. `SHORTLINK_*` environment variables, e.g. `SHORTLINK_DATABASE_URL`

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::error::{AppError, Result};

/// Environment variable prefix, e.g. `SHORTLINK_PORT=9000`.
pub const ENV_PREFIX: &str = "SHORTLINK";

/// Base name of the optional settings file.
pub const CONFIG_FILE: &str = "shortlink";

/// Longest accepted read-cache TTL: 100 years, in minutes.
pub const MAX_CACHE_TTL_MINUTES: u64 = 100 * 365 * 24 * 60;

/// Main application settings.
///
/// # Example
/// ```rust
/// use shortlink::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener host.
    pub host: String,

    /// Listener port.
    pub port: u16,

    /// Prefix of every short URL; the token is appended verbatim.
    pub base_url: String,

    /// SQLite connection string.
    pub database_url: String,

    /// Upper bound on pooled connections.
    pub database_max_pool_size: u32,

    /// How long an operation may wait for a pooled connection.
    pub database_connection_timeout_ms: u64,

    /// Months until a newly stored URL row is marked as expired.
    pub url_expiry_months: u32,

    /// Maximum number of live entries in the read cache.
    pub cache_maximum_entries: u64,

    /// Minutes a cache entry lives after it was written.
    pub cache_expire_after_write_minutes: u64,

    /// Generate-and-insert attempts before a token collision is surfaced.
    pub token_max_attempts: u32,

    /// Upper bound on the time spent serving a single request.
    pub request_timeout_secs: u64,

    /// Runtime environment.
    pub environment: Environment,
}

/// Runtime environment of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://localhost:8080/".to_string(),
            database_url: "sqlite://data/shortlink.db?mode=rwc".to_string(),
            database_max_pool_size: 10,
            database_connection_timeout_ms: 30_000,
            url_expiry_months: 12,
            cache_maximum_entries: 10_000,
            cache_expire_after_write_minutes: 60,
            token_max_attempts: 5,
            request_timeout_secs: 30,
            environment: Environment::Development,
        }
    }
}

impl Config {
    /// Loads settings from the optional config file and the environment.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when a source cannot be read or a value
    /// has the wrong type, or when [`Config::validate`] rejects the result.
    pub fn load() -> Result<Self> {
        let config: Config = ::config::Config::builder()
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::Config("port cannot be 0".to_string()));
        }

        let base = url::Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("base_url is not a URL: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::Config(
                "base_url must use http or https".to_string(),
            ));
        }
        if !self.base_url.ends_with('/') {
            return Err(AppError::Config("base_url must end with '/'".to_string()));
        }

        if self.database_max_pool_size == 0 {
            return Err(AppError::Config(
                "database_max_pool_size must be at least 1".to_string(),
            ));
        }

        if self.cache_maximum_entries == 0 {
            return Err(AppError::Config(
                "cache_maximum_entries must be at least 1".to_string(),
            ));
        }

        if self.cache_expire_after_write_minutes > MAX_CACHE_TTL_MINUTES {
            return Err(AppError::Config(format!(
                "cache_expire_after_write_minutes must be at most {MAX_CACHE_TTL_MINUTES}"
            )));
        }

        if self.token_max_attempts == 0 {
            return Err(AppError::Config(
                "token_max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` for the TCP listener.
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.database_connection_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read cache settings derived from this config. The TTL is capped at
    /// [`MAX_CACHE_TTL_MINUTES`] even when `validate` was skipped.
    #[must_use]
    pub fn cache(&self) -> CacheConfig {
        CacheConfig {
            maximum_entries: self.cache_maximum_entries,
            expire_after_write: Duration::from_secs(
                self.cache_expire_after_write_minutes
                    .min(MAX_CACHE_TTL_MINUTES)
                    .saturating_mul(60),
            ),
        }
    }
}

// =====================================
// Builder
// =====================================
/// Builds a [`Config`] starting from the defaults.
///
/// ```rust
/// use shortlink::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .port(9000)
///     .base_url("http://sho.rt/")
///     .build();
/// assert_eq!(config.port, 9000);
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    #[must_use]
    pub fn database_max_pool_size(mut self, size: u32) -> Self {
        self.config.database_max_pool_size = size;
        self
    }

    #[must_use]
    pub fn url_expiry_months(mut self, months: u32) -> Self {
        self.config.url_expiry_months = months;
        self
    }

    #[must_use]
    pub fn cache_maximum_entries(mut self, entries: u64) -> Self {
        self.config.cache_maximum_entries = entries;
        self
    }

    #[must_use]
    pub fn cache_expire_after_write_minutes(mut self, minutes: u64) -> Self {
        self.config.cache_expire_after_write_minutes = minutes;
        self
    }

    #[must_use]
    pub fn token_max_attempts(mut self, attempts: u32) -> Self {
        self.config.token_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }

    /// # Errors
    /// Returns the first problem found by [`Config::validate`].
    pub fn build_validated(self) -> Result<Config> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
