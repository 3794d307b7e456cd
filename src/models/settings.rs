use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

pub const SUPPORTED_LOCALES: &[&str] = &["en"];

pub const WORD_LENGTH_MIN: i32 = 3;
pub const WORD_LENGTH_MAX: i32 = 5;
pub const TURN_TIME_MIN: i32 = 30;
pub const TURN_TIME_MAX: i32 = 120;
pub const MAX_TURNS_MIN: i32 = 5;
pub const MAX_TURNS_MAX: i32 = 20;

/// Per-game tunables mapping to the `game_settings` table.
/// Defaults (word_length 3, turn_time 60, max_turns 10) live in the schema.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub id: String,
    pub locale: String,
    pub word_length: i32,
    pub turn_time: i32,
    pub max_turns: i32,
}

/// Host-supplied overrides applied when preparing a game for start.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub locale: Option<String>,
    pub word_length: Option<i32>,
    pub turn_time: Option<i32>,
    pub max_turns: Option<i32>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.locale.is_none()
            && self.word_length.is_none()
            && self.turn_time.is_none()
            && self.max_turns.is_none()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(locale) = &self.locale {
            if !SUPPORTED_LOCALES.contains(&locale.as_str()) {
                return Err(SettingsError::UnsupportedLocale(locale.clone()));
            }
        }
        if let Some(value) = self.word_length {
            if !(WORD_LENGTH_MIN..=WORD_LENGTH_MAX).contains(&value) {
                return Err(SettingsError::WordLengthOutOfRange { value });
            }
        }
        if let Some(value) = self.turn_time {
            if !(TURN_TIME_MIN..=TURN_TIME_MAX).contains(&value) {
                return Err(SettingsError::TurnTimeOutOfRange { value });
            }
        }
        if let Some(value) = self.max_turns {
            if !(MAX_TURNS_MIN..=MAX_TURNS_MAX).contains(&value) {
                return Err(SettingsError::MaxTurnsOutOfRange { value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("Word length must be between {WORD_LENGTH_MIN} and {WORD_LENGTH_MAX}, got {value}")]
    WordLengthOutOfRange { value: i32 },

    #[error("Turn time must be between {TURN_TIME_MIN} and {TURN_TIME_MAX} seconds, got {value}")]
    TurnTimeOutOfRange { value: i32 },

    #[error("Max turns must be between {MAX_TURNS_MIN} and {MAX_TURNS_MAX}, got {value}")]
    MaxTurnsOutOfRange { value: i32 },
}
