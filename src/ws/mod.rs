pub mod bus;
pub mod handler;
pub mod messages;

pub use bus::EventBus;

use axum::{Router, routing::get};

use crate::models::GameDetail;
use crate::state::AppState;
use messages::GameEvent;

/// Create WebSocket routes (grouped under `/ws`).
///
/// Routes:
/// - GET `/ws/games/{game_id}` - Subscribe to a game's event stream
pub fn create_ws_routes(state: AppState) -> Router {
    let ws_router = Router::new()
        .route("/games/{game_id}", get(handler::game_socket_handler))
        .with_state(state);

    Router::new().nest("/ws", ws_router)
}

/// Publish the refreshed game state to the game's subscribers.
pub async fn publish_game_update(state: &AppState, game: &GameDetail) {
    state
        .bus
        .publish(&game.id, GameEvent::game_updated(game.clone()))
        .await;
}

/// Publish the refreshed state and, if this command finished the game,
/// follow with the terminal `game_finished` event and retire the topic.
pub async fn publish_outcome(state: &AppState, game: &GameDetail, finished: bool) {
    publish_game_update(state, game).await;
    if finished {
        state
            .bus
            .publish(&game.id, GameEvent::game_finished(game))
            .await;
        state.bus.retire(&game.id).await;
    }
}
