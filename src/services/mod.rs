//! # Services
//!
//! ```text
//! ┌─────────────────┐
//! │    API Layer    │  <-- HTTP handlers (axum)
//! ├─────────────────┤
//! │  Service Layer  │  <-- UrlService
//! ├─────────────────┤
//! │   Read Cache    │  <-- moka
//! ├─────────────────┤
//! │   UrlStore      │  <-- SQLite
//! └─────────────────┘
//! ```

mod url_service;

pub use url_service::*;

use std::sync::Arc;

use crate::{
    cache::UrlCache,
    config::Config,
    database::{Database, SqliteUrlStore},
    utils::HexTokenGenerator,
};

// =====================================
// Application State
// =====================================
/// Shared by every handler. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Kept for the health probe.
    pub database: Database,

    pub url_service: Arc<UrlService>,
}

impl AppState {
    /// Wires the SQLite store, the hex token generator and a fresh read
    /// cache into a [`UrlService`].
    #[must_use]
    pub fn new(db: Database, config: Config) -> Self {
        let config = Arc::new(config);

        let store = Arc::new(SqliteUrlStore::new(db.clone(), config.url_expiry_months));
        let cache = UrlCache::new(config.cache());

        let url_service = Arc::new(UrlService::new(
            store,
            Arc::new(HexTokenGenerator::default()),
            cache,
            config.clone(),
        ));

        Self {
            config,
            database: db,
            url_service,
        }
    }
}
