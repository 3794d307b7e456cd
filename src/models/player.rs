use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "player_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerType {
    Host,
    Human,
    Bot,
    Spectator,
    Winner,
}

/// Player model mapping to the `player` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub game_id: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub player_type: PlayerType,
    /// Opaque client token; never serialized outward.
    #[serde(skip)]
    pub session_key: Option<String>,
    pub is_connected: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Player {
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            player_type: self.player_type,
            is_connected: self.is_connected,
        }
    }

    pub fn validate_name(name: &str) -> Result<&str, PlayerNameError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PlayerNameError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LEN {
            return Err(PlayerNameError::TooLong {
                len,
                max: MAX_NAME_LEN,
            });
        }
        Ok(trimmed)
    }
}

/// Client-safe view of a player.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub player_type: PlayerType,
    pub is_connected: bool,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PlayerNameError {
    #[error("Player name cannot be empty")]
    Empty,

    #[error("Player name cannot exceed {max} characters, got {len}")]
    TooLong { len: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(Player::validate_name("  Alice ").unwrap(), "Alice");
        assert!(Player::validate_name("").is_err());
        assert!(Player::validate_name("   ").is_err());
        assert!(Player::validate_name(&"x".repeat(256)).is_err());
        assert!(Player::validate_name(&"x".repeat(255)).is_ok());
    }
}
