// Game command handlers: thin entry points that delegate to the rules
// engine and publish the resulting events.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use serde::{Deserialize, Serialize};

use super::reject;
use crate::auth::{SESSION_COOKIE, SessionKey};
use crate::db::game::GameRepository;
use crate::engine::driver;
use crate::errors::ErrorDetail;
use crate::ids;
use crate::models::{Game, GameDetail, SettingsUpdate};
use crate::state::AppState;
use crate::ws::{self, messages::GameEvent};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub word: String,
    pub duration: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new game. Returns the full serialized game.
pub async fn create_game(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<GameDetail>), (StatusCode, Json<ErrorDetail>)> {
    let game = state
        .engine()
        .create_game()
        .await
        .map_err(|e| reject("-", None, e))?;

    tracing::info!(game_id = %game.id, "game created");
    Ok((StatusCode::CREATED, Json(game)))
}

/// Get the full serialized state of one game. Public endpoint.
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameDetail>, (StatusCode, Json<ErrorDetail>)> {
    let repo = GameRepository::new(state.postgres.clone());
    let detail = repo
        .detail(&game_id)
        .await
        .map_err(|e| reject(&game_id, None, e))?;

    Ok(Json(detail))
}

/// List games that have not finished. Public endpoint.
pub async fn list_games(
    State(state): State<AppState>,
) -> Result<Json<Vec<Game>>, (StatusCode, Json<ErrorDetail>)> {
    let repo = GameRepository::new(state.postgres.clone());
    let games = repo.list_active().await.map_err(|e| reject("-", None, e))?;

    Ok(Json(games))
}

/// Join a WAITING game. Issues the session cookie if the client has none.
pub async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    jar: CookieJar,
    Json(payload): Json<JoinGameRequest>,
) -> Result<(StatusCode, CookieJar, Json<JoinGameResponse>), (StatusCode, Json<ErrorDetail>)> {
    let existing = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let (session_key, jar) = match existing {
        Some(key) => (key, jar),
        None => {
            let key = ids::entity_id();
            let cookie = Cookie::build((SESSION_COOKIE, key.clone()))
                .path("/")
                .http_only(true)
                .build();
            (key, jar.add(cookie))
        }
    };

    let outcome = state
        .engine()
        .join(&game_id, &payload.name, &session_key)
        .await
        .map_err(|e| reject(&game_id, Some(&session_key), e))?;

    state
        .bus
        .publish(&game_id, GameEvent::player_joined(outcome.player.clone()))
        .await;
    ws::publish_game_update(&state, &outcome.game).await;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(JoinGameResponse {
            id: outcome.player.id,
        }),
    ))
}

/// Start a WAITING game: apply the host's setting overrides, flip to
/// PLAYING and launch the turn driver.
pub async fn start_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    SessionKey(session_key): SessionKey,
    Json(overrides): Json<SettingsUpdate>,
) -> Result<StatusCode, (StatusCode, Json<ErrorDetail>)> {
    let engine = state.engine();
    engine
        .prepare_start(&game_id, &session_key, &overrides)
        .await
        .map_err(|e| reject(&game_id, Some(&session_key), e))?;
    let game = engine
        .start(&game_id, Some(&session_key))
        .await
        .map_err(|e| reject(&game_id, Some(&session_key), e))?;

    ws::publish_game_update(&state, &game).await;
    driver::spawn(&state, game_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Reset a FINISHED game back to WAITING so the party can play again.
pub async fn restart_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    SessionKey(session_key): SessionKey,
) -> Result<StatusCode, (StatusCode, Json<ErrorDetail>)> {
    let game = state
        .engine()
        .restart(&game_id, &session_key)
        .await
        .map_err(|e| reject(&game_id, Some(&session_key), e))?;

    ws::publish_game_update(&state, &game).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Submit a word for the caller's turn.
pub async fn take_turn(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    SessionKey(session_key): SessionKey,
    Json(payload): Json<TurnRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorDetail>)> {
    let outcome = state
        .engine()
        .submit_turn(&game_id, &session_key, &payload.word, payload.duration)
        .await
        .map_err(|e| reject(&game_id, Some(&session_key), e))?;

    ws::publish_outcome(&state, &outcome.game, outcome.finished).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Leave a game. Ends the game when it drops under quorum.
pub async fn leave_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    SessionKey(session_key): SessionKey,
) -> Result<StatusCode, (StatusCode, Json<ErrorDetail>)> {
    let outcome = state
        .engine()
        .leave(&game_id, &session_key)
        .await
        .map_err(|e| reject(&game_id, Some(&session_key), e))?;

    state
        .bus
        .publish(&game_id, GameEvent::player_left(outcome.player.clone()))
        .await;
    ws::publish_outcome(&state, &outcome.game, outcome.finished).await;

    Ok(StatusCode::NO_CONTENT)
}
