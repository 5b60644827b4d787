//! # Health Check Handler

use axum::{extract::State, Json};
use tracing::warn;

use crate::{models::HealthResponse, services::AppState};

/// `GET /health`
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": true }
/// ```
///
/// Always 200; a failed probe reports `"degraded"`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_ok = match state.database.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health probe failed");
            false
        }
    };

    Json(HealthResponse::from_probe(database_ok))
}
