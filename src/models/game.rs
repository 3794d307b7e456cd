use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::models::{GameSettings, GameWord, PlayerSummary};

/// Game lifecycle status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "game_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// Game model mapping to the `game` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub status: GameStatus,
    pub current_turn: i32,
    pub current_player_id: Option<String>,
    pub winner_id: Option<String>,
    pub settings_id: String,
    pub turn_time_left: i32,
    pub last_word: Option<String>,
    /// Claim token of the turn driver that owns this game; never exposed.
    #[serde(skip)]
    pub task_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Game {
    pub fn is_started(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// The letter the next word must start with.
    pub fn chain_letter(&self) -> Option<char> {
        self.last_word
            .as_ref()
            .and_then(|w| w.chars().last())
            .map(|c| c.to_ascii_lowercase())
    }
}

/// One row of a game's leaderboard: players ranked by the sum of their
/// word scores, earliest join breaking ties.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub score: f64,
}

/// Fully serialized game state as pushed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    pub id: String,
    pub status: GameStatus,
    pub current_turn: i32,
    pub current_player_id: Option<String>,
    pub winner_id: Option<String>,
    pub turn_time_left: i32,
    pub last_word: Option<String>,
    pub settings: GameSettings,
    pub players: Vec<PlayerSummary>,
    pub words: Vec<GameWord>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub created_at: NaiveDateTime,
}

impl GameDetail {
    pub fn winner(&self) -> Option<&PlayerSummary> {
        let winner_id = self.winner_id.as_deref()?;
        self.players.iter().find(|p| p.id == winner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_letter() {
        let mut game = Game {
            id: "abc12".to_string(),
            status: GameStatus::Waiting,
            current_turn: 0,
            current_player_id: None,
            winner_id: None,
            settings_id: "s".to_string(),
            turn_time_left: 0,
            last_word: Some("apple".to_string()),
            task_id: None,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };
        assert_eq!(game.chain_letter(), Some('e'));

        game.last_word = None;
        assert_eq!(game.chain_letter(), None);
    }
}
