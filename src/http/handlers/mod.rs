pub mod game;

use std::hash::{DefaultHasher, Hash, Hasher};

use axum::Json;
use axum::http::StatusCode;

use crate::errors::{AppError, ErrorDetail};

/// Map an engine error onto the client-facing `{detail}` body, logging it
/// on the way out. Rule violations are expected in normal play and only
/// show up at debug; everything else is worth a real log line.
pub(crate) fn reject(
    game_id: &str,
    session_key: Option<&str>,
    err: AppError,
) -> (StatusCode, Json<ErrorDetail>) {
    if err.is_rule_violation() {
        tracing::debug!(%game_id, error = %err, "rejected command");
    } else {
        tracing::error!(
            %game_id,
            session = %session_key.map(hash_session).unwrap_or_default(),
            error = %err,
            "command failed"
        );
    }
    let (status, detail) = err.to_response();
    (status, Json(ErrorDetail { detail }))
}

/// Session keys are client credentials; only a hash ever reaches the logs.
fn hash_session(session_key: &str) -> String {
    let mut hasher = DefaultHasher::new();
    session_key.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
