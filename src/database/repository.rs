//! # URL Store
//!
//! [`UrlStore`] is the persistence seam of the service: single-row reads and
//! writes over `original_urls`, `tokens` and `redirect_analytics`. The engine
//! only depends on the trait, so tests can swap in a mock.
//!
//! Every method acquires a pooled connection for the duration of the call and
//! returns it on every exit path; unique-key violations surface as
//! [`StoreError::Conflict`] so callers can tell them apart from outages.

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use thiserror::Error;
use tracing::{debug, instrument};

use super::Database;
use crate::models::StoreStats;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No connection could be acquired in time, or the database is gone.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    /// A write referenced a row that is gone, e.g. deleted concurrently.
    #[error("referenced row is missing: {0}")]
    MissingReference(String),
    #[error("query failed: {0}")]
    Query(String),
    /// A stored value could not be decoded.
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Long URL behind `token`, if the token is live.
    async fn resolve(&self, token: &str) -> StoreResult<Option<String>>;

    /// Surrogate id of the row holding `long_url`.
    async fn find_id_by_url(&self, long_url: &str) -> StoreResult<Option<i64>>;

    /// Inserts a new URL row and returns its id.
    /// Fails with `Conflict` when `long_url` is already stored.
    async fn insert_url(&self, long_url: &str) -> StoreResult<i64>;

    /// Binds `token` to the URL row `url_id`.
    /// Fails with `Conflict` when the token is taken or the row already has a
    /// token, and with `MissingReference` when the row no longer exists.
    async fn insert_mapping(&self, token: &str, url_id: i64) -> StoreResult<()>;

    /// Live token of the URL row `url_id`.
    async fn find_token_by_url_id(&self, url_id: i64) -> StoreResult<Option<String>>;

    /// Removes the token and its URL row atomically.
    /// Returns `false` (and changes nothing) when either row is missing.
    async fn delete_token(&self, token: &str) -> StoreResult<bool>;

    /// Adds one to the redirect counter of `long_url`, creating it at 1.
    async fn increment_redirect_count(&self, long_url: &str) -> StoreResult<()>;

    /// Aggregate counters over all tables.
    async fn stats(&self) -> StoreResult<StoreStats>;
}

// =====================================
// SQLite implementation
// =====================================
#[derive(Debug, Clone)]
pub struct SqliteUrlStore {
    db: Database,
    expiry_months: u32,
}

impl SqliteUrlStore {
    /// `expiry_months` sets the advisory `expiration_date` of new URL rows.
    #[must_use]
    pub fn new(db: Database, expiry_months: u32) -> Self {
        Self { db, expiry_months }
    }

    fn expiration_date(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_months(Months::new(self.expiry_months))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Classifies a driver error.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::Conflict(err.to_string());
    }
    if err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
    {
        return StoreError::MissingReference(err.to_string());
    }

    let message = err.to_string();
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StoreError::InvalidData(message),
        _ => StoreError::Query(message),
    }
}

#[async_trait]
impl UrlStore for SqliteUrlStore {
    #[instrument(skip(self))]
    async fn resolve(&self, token: &str) -> StoreResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT ou.long_url
            FROM original_urls ou
            JOIN tokens t ON ou.id = t.original_url_id
            WHERE t.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_id_by_url(&self, long_url: &str) -> StoreResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM original_urls WHERE long_url = ?")
            .bind(long_url)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx_error)
    }

    #[instrument(skip(self))]
    async fn insert_url(&self, long_url: &str) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO original_urls (long_url, expiration_date) VALUES (?, ?)",
        )
        .bind(long_url)
        .bind(self.expiration_date(Utc::now()))
        .execute(self.db.pool())
        .await
        .map_err(map_sqlx_error)?;

        let id = result.last_insert_rowid();
        debug!(id, "Stored original URL");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn insert_mapping(&self, token: &str, url_id: i64) -> StoreResult<()> {
        sqlx::query("INSERT INTO tokens (token, original_url_id) VALUES (?, ?)")
            .bind(token)
            .bind(url_id)
            .execute(self.db.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_token_by_url_id(&self, url_id: i64) -> StoreResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT token FROM tokens WHERE original_url_id = ?")
            .bind(url_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(map_sqlx_error)
    }

    #[instrument(skip(self))]
    async fn delete_token(&self, token: &str) -> StoreResult<bool> {
        let mut tx = self.db.pool().begin().await.map_err(map_sqlx_error)?;

        // Write first: a deferred transaction that reads before writing gets
        // SQLITE_BUSY on upgrade without waiting out busy_timeout.
        let url_id = sqlx::query_scalar::<_, i64>(
            "DELETE FROM tokens WHERE token = ? RETURNING original_url_id",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(url_id) = url_id else {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(false);
        };

        let url_deleted = sqlx::query("DELETE FROM original_urls WHERE id = ?")
            .bind(url_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        if url_deleted > 0 {
            tx.commit().await.map_err(map_sqlx_error)?;
            Ok(true)
        } else {
            tx.rollback().await.map_err(map_sqlx_error)?;
            Ok(false)
        }
    }

    async fn increment_redirect_count(&self, long_url: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO redirect_analytics (original_url, redirect_count)
            VALUES (?, 1)
            ON CONFLICT(original_url) DO UPDATE SET redirect_count = redirect_count + 1
            "#,
        )
        .bind(long_url)
        .execute(self.db.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        sqlx::query_as::<_, StoreStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM original_urls) AS total_urls,
                (SELECT COUNT(*) FROM tokens) AS live_tokens,
                (SELECT COALESCE(SUM(redirect_count), 0) FROM redirect_analytics) AS total_redirects
            "#,
        )
        .fetch_one(self.db.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
