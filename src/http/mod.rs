pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use handlers::game;

/// Create the HTTP command routes.
pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/games", post(game::create_game).get(game::list_games))
        .route("/games/{game_id}", get(game::get_game))
        .route("/games/{game_id}/join", post(game::join_game))
        .route("/games/{game_id}/start", post(game::start_game))
        .route("/games/{game_id}/restart", post(game::restart_game))
        .route("/games/{game_id}/turn", post(game::take_turn))
        .route("/games/{game_id}/leave", post(game::leave_game))
        .with_state(state)
}
