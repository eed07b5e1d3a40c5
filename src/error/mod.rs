//! Application error types for robust error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::handlers::response::failure;

/// Application-level errors.
///
/// Negative outcomes that callers branch on (wrong password, unknown id) are
/// returned as `bool`/`Option` by the store; only exceptional conditions end
/// up here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access denied, missing token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Password hashing error: {0}")]
    Hash(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Storage(_)
            | AppError::Hash(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        failure(status, self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
