//! # Error Handling
//!
//! [`AppError`] is the single error type crossing the service and HTTP
//! layers. Each variant knows its HTTP status; converting an `AppError` into
//! a response logs server-side failures and hides their detail from clients.
//!
//! Store failures arrive as [`StoreError`] and are classified on the way in:
//!
//! | store error   | app error            | status |
//! |---------------|----------------------|--------|
//! | `Unavailable` | `StoreUnavailable`   | 500    |
//! | `Conflict`    | `ConstraintConflict` | 500    |
//! | anything else | `DataAccess`         | 500    |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::database::StoreError;

/// Result alias with [`AppError`] as the default error.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    // ----------------------------------------
    // Client errors (4xx)
    // ----------------------------------------
    /// Request body could not be read as the expected JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A long URL failed syntax validation.
    #[error("Invalid URL: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ----------------------------------------
    // Server errors (5xx)
    // ----------------------------------------
    /// Pool exhausted, acquisition timed out, or the database went away.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A unique constraint rejected a write that could not be recovered.
    #[error("Constraint conflict: {0}")]
    ConstraintConflict(String),

    /// Any other store failure.
    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::StoreUnavailable(_)
            | Self::ConstraintConflict(_)
            | Self::DataAccess(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Migration(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    #[must_use]
    pub fn token_not_found(token: &str) -> Self {
        Self::NotFound(format!("Short URL '{token}' not found"))
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Canonical reason phrase, e.g. "Not Found".
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = Some(status.as_u16());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side detail goes to the log, never to the client.
        let message = if self.is_server_error() {
            error!(error = %self, "Server error occurred");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse::new(status.canonical_reason().unwrap_or("Error"), message)
            .with_status(status);

        (status, Json(body)).into_response()
    }
}

// =====================================
// Conversions
// =====================================
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => AppError::StoreUnavailable(message),
            StoreError::Conflict(message) => AppError::ConstraintConflict(message),
            StoreError::MissingReference(message)
            | StoreError::Query(message)
            | StoreError::InvalidData(message) => AppError::DataAccess(message),
        }
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(err: ::config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

// =====================================
// Option Extensions
// =====================================
pub trait OptionExt<T> {
    /// Turns `None` into [`AppError::NotFound`].
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.into()))
    }
}
