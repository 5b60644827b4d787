//! # Middleware

use axum::{
    body::Body,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Echoes the inbound `X-Request-Id`, or mints one, on both the request
/// and the response.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let inbound = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty())
        .cloned();

    let id = match inbound {
        Some(id) => id,
        // nanoid's alphabet is header-safe
        None => match HeaderValue::from_str(&nanoid::nanoid!(12)) {
            Ok(id) => id,
            Err(_) => return next.run(request).await,
        },
    };

    request.headers_mut().insert(REQUEST_ID_HEADER, id.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, id);
    response
}
