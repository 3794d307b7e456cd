//! Events pushed to game subscribers. The `type` tag carries the event
//! kind; payload keys are camelCase.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{GameDetail, LeaderboardEntry, PlayerSummary};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Full serialized game state; sent after every accepted command and
    /// as the bootstrap message on connect.
    #[serde(rename_all = "camelCase")]
    GameUpdated { game: GameDetail },

    /// One-second countdown pulse from the turn driver.
    #[serde(rename_all = "camelCase")]
    TurnTick { turn_time_left: i32 },

    #[serde(rename_all = "camelCase")]
    PlayerJoined { player: PlayerSummary },

    #[serde(rename_all = "camelCase")]
    PlayerLeft { player: PlayerSummary },

    /// Terminal event: the last message on a topic before it is retired.
    #[serde(rename_all = "camelCase")]
    GameFinished {
        winner: Option<PlayerSummary>,
        leaderboard: Vec<LeaderboardEntry>,
    },
}

impl GameEvent {
    pub fn game_updated(game: GameDetail) -> Self {
        GameEvent::GameUpdated { game }
    }

    pub fn turn_tick(turn_time_left: i32) -> Self {
        GameEvent::TurnTick { turn_time_left }
    }

    pub fn player_joined(player: PlayerSummary) -> Self {
        GameEvent::PlayerJoined { player }
    }

    pub fn player_left(player: PlayerSummary) -> Self {
        GameEvent::PlayerLeft { player }
    }

    pub fn game_finished(game: &GameDetail) -> Self {
        GameEvent::GameFinished {
            winner: game.winner().cloned(),
            leaderboard: game.leaderboard.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }
}
