//! Per-connection session gateway.
//!
//! Adapts one WebSocket to the core: resolves the player from the session
//! cookie, marks them connected, subscribes to the game's topic and relays
//! events outward. Inbound frames are ignored; commands go through HTTP.
//!
//! On close the player is marked disconnected and a delayed cleanup job is
//! queued: after the grace window the player is removed iff they have not
//! reconnected, so flicker-disconnects do not end games.

use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::CookieJar;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::auth::SESSION_COOKIE;
use crate::db::{game::GameRepository, player::PlayerRepository};
use crate::errors::ErrorDetail;
use crate::models::Player;
use crate::state::AppState;
use crate::ws::{self, messages::GameEvent};

/// HTTP endpoint: upgrade to a WebSocket subscribed to one game's events.
pub async fn game_socket_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<String>,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorDetail>)> {
    let games = GameRepository::new(state.postgres.clone());
    let game = games
        .find_active(&game_id)
        .await
        .map_err(|e| {
            let (status, detail) = e.to_response();
            (status, Json(ErrorDetail { detail }))
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorDetail {
                    detail: format!("Game {} not found", game_id),
                }),
            )
        })?;

    let session_key = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let player = match &session_key {
        Some(session_key) => PlayerRepository::new(state.postgres.clone())
            .find_by_session(&game_id, session_key)
            .await
            .map_err(|e| {
                let (status, detail) = e.to_response();
                (status, Json(ErrorDetail { detail }))
            })?,
        None => None,
    };

    // Unknown visitors may watch while seating is open; a live game is
    // only pushed to its own players.
    if player.is_none() && game.is_started() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorDetail {
                detail: "This game is not open to new spectators".to_string(),
            }),
        ));
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, game_id, player)))
}

async fn handle_socket(socket: WebSocket, state: AppState, game_id: String, player: Option<Player>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the bootstrap read so no event can slip between.
    let mut events = state.bus.subscribe(&game_id).await;

    let players = PlayerRepository::new(state.postgres.clone());
    if let Some(player) = &player {
        match players.set_connected(&player.id, true).await {
            Ok(_) => broadcast_state(&state, &game_id).await,
            Err(e) => tracing::warn!(%game_id, error = %e, "failed to mark player connected"),
        }
    }

    // Bootstrap: the full game state, as a regular game_updated event.
    let games = GameRepository::new(state.postgres.clone());
    match games.detail(&game_id).await {
        Ok(detail) => {
            if let Ok(json) = GameEvent::game_updated(detail).to_json() {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    return;
                }
            }
        }
        Err(e) => {
            tracing::warn!(%game_id, error = %e, "failed to load bootstrap state");
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(json) = event.to_json() else { continue };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                // Fell behind: the oldest events are gone, newer ones follow.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(%game_id, skipped, "subscriber lagged, dropping oldest events");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                // Clients send nothing the core acts on.
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(events);
    state.bus.prune(&game_id).await;

    if let Some(player) = player {
        match players.set_connected(&player.id, false).await {
            Ok(_) => broadcast_state(&state, &game_id).await,
            Err(e) => tracing::warn!(%game_id, error = %e, "failed to mark player disconnected"),
        }
        schedule_disconnect_cleanup(state, game_id, player.id);
    }
}

/// Queue the delayed cleanup job for a disconnected player.
fn schedule_disconnect_cleanup(state: AppState, game_id: String, player_id: String) {
    let grace = state.config.disconnect_grace();
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        match state.engine().leave_player(&player_id).await {
            Ok(Some(outcome)) => {
                tracing::info!(%game_id, %player_id, "removed player after disconnect grace");
                state
                    .bus
                    .publish(&game_id, GameEvent::player_left(outcome.player.clone()))
                    .await;
                ws::publish_outcome(&state, &outcome.game, outcome.finished).await;
            }
            // Reconnected in time, or already gone.
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(%game_id, %player_id, error = %e, "disconnect cleanup failed");
            }
        }
    });
}

/// Push a fresh game_updated after a connection-state change.
async fn broadcast_state(state: &AppState, game_id: &str) {
    let games = GameRepository::new(state.postgres.clone());
    match games.detail(game_id).await {
        Ok(detail) => {
            ws::publish_game_update(state, &detail).await;
        }
        Err(e) => tracing::warn!(%game_id, error = %e, "failed to broadcast state change"),
    }
}
