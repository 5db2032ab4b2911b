// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::models::answer_key::TestCode;

/// Failures of the persistence layer.
/// These are the only faults treated as fatal for the affected operation.
#[derive(Debug)]
pub enum StoreError {
    Io {
        namespace: String,
        source: std::io::Error,
    },
    Serialization {
        namespace: String,
        source: serde_json::Error,
    },
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { namespace, source } => {
                write!(f, "i/o error on store '{}': {}", namespace, source)
            }
            StoreError::Serialization { namespace, source } => {
                write!(f, "malformed snapshot '{}': {}", namespace, source)
            }
            StoreError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Serialization { source, .. } => Some(source),
            StoreError::Database(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Database(sqlx::Error::Migrate(Box::new(err)))
    }
}

/// Domain failures of the quiz core.
///
/// Everything except `Store` is a recoverable, user-visible outcome: the
/// `Display` text is what the participant or administrator gets to read.
#[derive(Debug)]
pub enum QuizError {
    /// Submission or registration that does not follow the expected format.
    /// Carries the format hint.
    Malformed(&'static str),
    InvalidCode(String),
    UnknownCode(TestCode),
    DocumentNotFound(TestCode),
    LengthMismatch { expected: usize, received: usize },
    TooManyAnswers { limit: usize },
    NotAdmin,
    NoPendingUpload,
    Store(StoreError),
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::Malformed(hint) => write!(f, "❗ Format: {}", hint),
            QuizError::InvalidCode(code) => write!(f, "❗ '{}' is not a valid test code.", code),
            QuizError::UnknownCode(_) => write!(f, "❌ Unknown test code."),
            QuizError::DocumentNotFound(_) => write!(f, "❌ File not found."),
            QuizError::LengthMismatch { expected, .. } => write!(
                f,
                "⚠️ Wrong number of answers. Expected {} answers.",
                expected
            ),
            QuizError::TooManyAnswers { limit } => {
                write!(f, "❗ Too many answers. At most {} are accepted.", limit)
            }
            QuizError::NotAdmin => write!(f, "⛔ You do not have permission."),
            QuizError::NoPendingUpload => {
                write!(f, "❗ Register the answers first: /addanswers TEST123 A B 42 Paris")
            }
            QuizError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for QuizError {}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        QuizError::Store(err)
    }
}

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., document before answers)
    Conflict(String),

    // Invalid or missing configuration at startup
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) | AppError::Config(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Maps domain outcomes onto HTTP statuses for the resource routes.
impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        let message = err.to_string();
        match err {
            QuizError::Malformed(_)
            | QuizError::InvalidCode(_)
            | QuizError::LengthMismatch { .. }
            | QuizError::TooManyAnswers { .. } => AppError::BadRequest(message),
            QuizError::UnknownCode(_) | QuizError::DocumentNotFound(_) => {
                AppError::NotFound(message)
            }
            QuizError::NotAdmin => AppError::Forbidden(message),
            QuizError::NoPendingUpload => AppError::Conflict(message),
            QuizError::Store(e) => AppError::from(e),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
