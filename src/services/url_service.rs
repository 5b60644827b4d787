//! # URL Service
//!
//! The shorten / resolve / delete engine. It ties together the token
//! generator, the persistent store and the read cache:
//!
//! - `shorten` is idempotent: the same long URL keeps its live token until it
//!   is deleted.
//! - `resolve` reads through the cache and never caches a miss.
//! - `delete` removes the token and its URL row atomically.
//!
//! The only store failures handled here are the races a concurrent writer
//! can cause: unique-key conflicts, and a URL row deleted while a token was
//! being minted for it. Everything else propagates to the caller.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    cache::UrlCache,
    config::Config,
    database::{StoreError, UrlStore},
    error::{AppError, Result},
    models::StoreStats,
    utils::{self, TokenGenerator},
};

/// Passes `shorten` makes when its URL row keeps being deleted underneath it.
const SHORTEN_PASSES: u32 = 3;

pub struct UrlService {
    store: Arc<dyn UrlStore>,
    generator: Arc<dyn TokenGenerator>,
    cache: UrlCache,
    config: Arc<Config>,
}

impl UrlService {
    #[must_use]
    pub fn new(
        store: Arc<dyn UrlStore>,
        generator: Arc<dyn TokenGenerator>,
        cache: UrlCache,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            generator,
            cache,
            config,
        }
    }

    /// Returns the short URL for `long_url`, minting a token when needed.
    ///
    /// # Errors
    /// - `Validation` when `long_url` is not an acceptable URL; the store is
    ///   not touched in that case.
    /// - `ConstraintConflict` when every token attempt collided, or the URL
    ///   row was deleted under every pass.
    /// - Store failures, unchanged.
    #[instrument(skip(self))]
    pub async fn shorten(&self, long_url: &str) -> Result<String> {
        utils::validate_long_url(long_url).map_err(AppError::Validation)?;

        for pass in 1..=SHORTEN_PASSES {
            if let Some(token) = self.shorten_pass(long_url).await? {
                return Ok(utils::short_url(&self.config.base_url, &token));
            }
            debug!(pass, "URL row deleted while shortening, starting over");
        }

        Err(AppError::ConstraintConflict(format!(
            "'{long_url}' was deleted concurrently {SHORTEN_PASSES} times"
        )))
    }

    /// One attempt at finding or minting the token of `long_url`.
    /// `Ok(None)` means its URL row vanished midway.
    async fn shorten_pass(&self, long_url: &str) -> Result<Option<String>> {
        match self.store.find_id_by_url(long_url).await? {
            Some(url_id) => self.live_or_new_token(url_id).await,
            None => match self.store.insert_url(long_url).await {
                Ok(url_id) => self.mint_token(url_id).await,
                Err(StoreError::Conflict(_)) => {
                    // Another request stored the same URL between our read and insert.
                    debug!("URL inserted concurrently, re-reading its row");
                    match self.store.find_id_by_url(long_url).await? {
                        Some(url_id) => self.live_or_new_token(url_id).await,
                        None => Ok(None),
                    }
                }
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Long URL behind `token`, served from the cache when possible.
    ///
    /// `Ok(None)` means the token is unknown.
    #[instrument(skip(self))]
    pub async fn resolve(&self, token: &str) -> Result<Option<String>> {
        if let Some(long_url) = self.cache.get(token).await {
            debug!("Served from read cache");
            return Ok(Some(long_url));
        }

        let resolved = self.store.resolve(token).await?;
        if let Some(long_url) = &resolved {
            self.cache.put(token, long_url).await;
        }

        Ok(resolved)
    }

    /// Like [`resolve`](Self::resolve), and counts a redirect on a hit.
    ///
    /// A failing counter update is logged and otherwise ignored.
    pub async fn resolve_for_redirect(&self, token: &str) -> Result<Option<String>> {
        let resolved = self.resolve(token).await?;

        if let Some(long_url) = &resolved {
            if let Err(e) = self.store.increment_redirect_count(long_url).await {
                warn!(error = %e, token, "Failed to record redirect");
            }
        }

        Ok(resolved)
    }

    /// Deletes `token` and its URL row. Returns whether anything was removed.
    ///
    /// The token is also evicted from this process's cache.
    #[instrument(skip(self))]
    pub async fn delete(&self, token: &str) -> Result<bool> {
        let deleted = self.store.delete_token(token).await?;
        self.cache.invalidate(token).await;

        if deleted {
            info!("Deleted short URL");
        }
        Ok(deleted)
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        Ok(self.store.stats().await?)
    }

    async fn live_or_new_token(&self, url_id: i64) -> Result<Option<String>> {
        match self.store.find_token_by_url_id(url_id).await? {
            Some(token) => Ok(Some(token)),
            None => self.mint_token(url_id).await,
        }
    }

    /// Generates tokens until one is accepted for `url_id`.
    ///
    /// A conflict is either a token collision or a concurrent request that
    /// already gave this row a token; the latter wins and its token is returned.
    /// `Ok(None)` means the row was deleted before a token was bound.
    async fn mint_token(&self, url_id: i64) -> Result<Option<String>> {
        let attempts = self.config.token_max_attempts.max(1);

        for attempt in 1..=attempts {
            let token = self.generator.generate();

            match self.store.insert_mapping(&token, url_id).await {
                Ok(()) => {
                    info!(token = %token, url_id, "Minted token");
                    return Ok(Some(token));
                }
                Err(StoreError::MissingReference(_)) => return Ok(None),
                Err(StoreError::Conflict(_)) => {
                    if let Some(existing) = self.store.find_token_by_url_id(url_id).await? {
                        return Ok(Some(existing));
                    }
                    warn!(token = %token, attempt, "Token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::ConstraintConflict(format!(
            "no free token after {attempts} attempts"
        )))
    }
}
