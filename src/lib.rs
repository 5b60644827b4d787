//! # shortlink
//!
//! URL shortening service: long URLs are mapped to short random tokens,
//! stored in SQLite, and served back as redirects through a read cache.
//!
//! ```text
//! src/
//! ├── lib.rs
//! ├── main.rs         # binary: config, logging, server
//! ├── config/         # settings from shortlink.toml and SHORTLINK_* vars
//! ├── error/          # AppError and its HTTP mapping
//! ├── database/       # pool, migrations, UrlStore
//! ├── cache/          # moka read cache
//! ├── models/         # wire types
//! ├── services/       # shorten / resolve / delete engine
//! ├── api/            # axum router and handlers
//! └── utils/          # token generators, URL validation
//! ```
//!
//! ```rust,no_run
//! use shortlink::{api::create_router, config::Config, database::Database};
//!
//! # async fn run() -> shortlink::Result<()> {
//! let config = Config::load()?;
//! let database = Database::from_config(&config).await?;
//! database.migrate().await?;
//! let app = create_router(database, config);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AppError, Result};
