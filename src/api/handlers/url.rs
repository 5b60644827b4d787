//! # URL Handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::{
    api::extractors::ValidatedJson,
    error::{AppError, OptionExt, Result},
    models::{OriginalUrlResponse, ShortenRequest, ShortenResponse},
    services::AppState,
};

pub const WELCOME: &str = "Welcome to the URL Shortener API!";

/// `GET /`
pub async fn welcome() -> &'static str {
    WELCOME
}

// =====================================
// Shorten
// =====================================
/// `POST /shorten`
///
/// ```json
/// { "longUrl": "https://example.com/some/long/path" }
/// ```
///
/// Returns `{ "shortUrl": "..." }`. Shortening the same URL twice returns
/// the same short URL.
pub async fn shorten(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ShortenRequest>,
) -> Result<Json<ShortenResponse>> {
    let short_url = state.url_service.shorten(&request.long_url).await?;

    Ok(Json(ShortenResponse { short_url }))
}

// =====================================
// Redirect
// =====================================
/// `GET /:token`
///
/// - 302 with `Location` set to the original URL
/// - 404 if the token is unknown
pub async fn redirect(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response> {
    let original_url = state
        .url_service
        .resolve_for_redirect(&token)
        .await?
        .ok_or_else(|| AppError::token_not_found(&token))?;

    info!(token = %token, "Redirecting");

    // Redirect::temporary would answer 307
    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]).into_response())
}

// =====================================
// Get Original
// =====================================
/// `GET /original/:token`
///
/// Does not count as a redirect.
pub async fn get_original(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<OriginalUrlResponse>> {
    let original_url = state
        .url_service
        .resolve(&token)
        .await?
        .ok_or_not_found(format!("Short URL '{token}' not found"))?;

    Ok(Json(OriginalUrlResponse { original_url }))
}

// =====================================
// Delete
// =====================================
/// `DELETE /short/:token`
pub async fn delete_short_url(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    if !state.url_service.delete(&token).await? {
        return Err(AppError::token_not_found(&token));
    }

    Ok((StatusCode::OK, "Short URL deleted"))
}
