use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::models::player::PlayerNameError;
use crate::models::settings::SettingsError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Rule violation: wrong turn, bad word, game not startable. Never retried.
    #[error("{0}")]
    Invalid(String),

    /// Uniqueness violation: name taken, duplicate word, duplicate host.
    #[error("{0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient storage contention; retried internally with backoff.
    #[error("Transient storage error: {0}")]
    Retriable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Env error: {0}")]
    Env(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid player name: {0}")]
    PlayerName(#[from] PlayerNameError),
}

/// Client-visible error body.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl AppError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, AppError::Retriable(_))
    }

    /// Expected in normal play; logged at debug rather than error.
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            AppError::Invalid(_) | AppError::Settings(_) | AppError::PlayerName(_)
        )
    }

    pub fn to_response(&self) -> (StatusCode, String) {
        match self {
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Retriable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage is busy, please retry".to_string(),
            ),
            AppError::Database(_) | AppError::Serialization(_) | AppError::Env(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected server error".to_string(),
            ),
            AppError::Settings(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::PlayerName(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                AppError::Retriable("Connection pool timed out".to_string())
            }
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // Serialization failure / deadlock: safe to retry.
                Some("40001") | Some("40P01") => AppError::Retriable(db.message().to_string()),
                Some("23505") => AppError::Conflict(match db.constraint() {
                    Some("unique_name") => "That name is already taken in this game".to_string(),
                    Some("unique_session_key") => {
                        "You have already joined this game".to_string()
                    }
                    Some("unique_host") => "This game already has a host".to_string(),
                    Some("unique_word") => "That word has already been played".to_string(),
                    _ => db.message().to_string(),
                }),
                _ => AppError::Database(db.message().to_string()),
            },
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
