//! Error types for Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned in every error body.
///
/// Codes up to 18 keep the meaning they have in the library lending protocol;
/// conditions that protocol has no code for are numbered from 22.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    BookNotAvailable = 7,
    Duplicate = 8,
    MaxBooksReached = 11,
    BadValue = 18,
    NotInPossession = 22,
    InvalidPrice = 23,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User {email} already holds the maximum of {limit} books")]
    MaxBooks { email: String, limit: usize },

    #[error("Book not in possession: {0}")]
    NotInPossession(String),

    #[error("Book unavailable: {0}")]
    BookUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl AppError {
    /// HTTP status and wire code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::InvalidPrice(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidPrice),
            AppError::AlreadyExists(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::BookNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchUser),
            AppError::MaxBooks { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::MaxBooksReached)
            }
            AppError::NotInPossession(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NotInPossession)
            }
            AppError::BookUnavailable(_) => (StatusCode::CONFLICT, ErrorCode::BookNotAvailable),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
