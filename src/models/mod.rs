//! # Models
//!
//! Rows read back from the store and the JSON bodies of the HTTP API.

mod dto;

pub use dto::*;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Aggregate counters over the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Rows in `original_urls`, including ones without a live token.
    pub total_urls: i64,
    pub live_tokens: i64,
    /// Sum of all redirect counters.
    pub total_redirects: i64,
}
