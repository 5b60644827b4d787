//! # Stats Handler

use axum::{extract::State, Json};

use crate::{error::Result, models::StoreStats, services::AppState};

/// `GET /stats`
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StoreStats>> {
    let stats = state.url_service.stats().await?;
    Ok(Json(stats))
}
