//! # API Layer
//!
//! Routes:
//! - `GET /` - welcome text
//! - `GET /:token` - 302 redirect to the original URL
//! - `GET /original/:token` - original URL as JSON
//! - `POST /shorten` - create (or reuse) a short URL
//! - `DELETE /short/:token` - delete a short URL
//! - `GET /health` - health check
//! - `GET /stats` - aggregate counters

mod extractors;
mod handlers;
mod middleware;

pub use extractors::*;
pub use handlers::*;
pub use middleware::*;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, database::Database, services::AppState};

// =====================================
// Router Builder
// =====================================
/// Builds the application router over a fresh [`AppState`].
pub fn create_router(db: Database, config: Config) -> Router {
    router(AppState::new(db, config))
}

/// Builds the application router over an existing state.
pub fn router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(handlers::url::welcome))
        .route("/shorten", post(handlers::url::shorten))
        .route("/original/:token", get(handlers::url::get_original))
        .route("/short/:token", delete(handlers::url::delete_short_url))
        .route("/health", get(handlers::health::health_check))
        .route("/stats", get(handlers::stats::get_stats))
        .route("/:token", get(handlers::url::redirect))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
