//! Error types for the lab inventory server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    DbFailure = 3,
    NoSuchRecord = 5,
    InsufficientStock = 7,
    Duplicate = 8,
    BadValue = 18,
    ImportRejected = 22,
    EquipmentHasOpenIssues = 23,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Never carries the reason to the caller; see `IntoResponse`
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Import rejected with {} error(s)", .0.len())]
    ImportRejected(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Per-line messages for rejected imports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match self {
            AppError::Authentication(reason) => {
                tracing::debug!(%reason, "Authentication rejected");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::NotAuthenticated,
                    "Invalid credentials".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg),
            AppError::InsufficientStock { requested, available } => (
                StatusCode::CONFLICT,
                ErrorCode::InsufficientStock,
                format!("Only {} items available, {} requested", available, requested),
            ),
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::EquipmentHasOpenIssues, msg)
            }
            AppError::ImportRejected(errors) => {
                let message = format!("Import rejected: {} invalid row(s)", errors.len());
                details = Some(errors);
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ImportRejected, message)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Map a unique-constraint violation to a validation error, pass anything else through
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
