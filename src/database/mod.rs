//! # Database Layer
//!
//! Connection pool management for the SQLite store plus the
//! [`UrlStore`] repository seam the engine talks to.

mod repository;

pub use repository::*;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};
use tracing::debug;

use crate::{config::Config, error::Result};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Pool settings taken from [`Config`].
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// Bound on waiting for a free connection; also used as SQLite's busy timeout.
    pub acquire_timeout: Duration,
}

impl From<&Config> for PoolSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_connections: config.database_max_pool_size,
            acquire_timeout: config.connection_timeout(),
        }
    }
}

/// Shared handle to the connection pool. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    /// Opens a pool against `database_url`, creating the parent directory of
    /// a file database if needed. File databases run in WAL mode so readers
    /// never block the single writer.
    ///
    /// # Errors
    /// Fails when the URL is malformed, the directory cannot be created, or
    /// no connection can be established.
    pub async fn connect(database_url: impl AsRef<str>, settings: PoolSettings) -> Result<Self> {
        let url = database_url.as_ref();
        if let Some(path) = url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(settings.acquire_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(1)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .connect_with(options)
            .await?;

        debug!(
            max_connections = settings.max_connections,
            acquire_timeout_ms = settings.acquire_timeout.as_millis() as u64,
            "Database pool ready"
        );

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Opens a pool using the database settings of `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::connect(&config.database_url, PoolSettings::from(config)).await
    }

    /// Single-connection in-memory database with migrations applied.
    ///
    /// The connection is never recycled, since closing it would drop the data.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
        };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&*self.pool).await?;
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&*self.pool).await?;
        Ok(())
    }

    /// Closes every pooled connection; further operations fail as unavailable.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::in_memory().await.unwrap();
        db.health_check().await.unwrap();

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(db.pool())
                .await
                .unwrap();

        for expected in ["original_urls", "redirect_analytics", "tokens"] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[test]
    fn test_pool_settings_from_config() {
        let config = crate::config::ConfigBuilder::new()
            .database_max_pool_size(3)
            .build();
        let settings = PoolSettings::from(&config);

        assert_eq!(settings.max_connections, 3);
        assert_eq!(settings.acquire_timeout, Duration::from_millis(30_000));
    }
}
