use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::prelude::FromRow;

/// One recorded move, mapping to the `game_word` table.
/// A NULL `word` records a timed-out turn; its score is negative.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameWord {
    pub id: String,
    pub game_id: String,
    pub player_id: Option<String>,
    pub word: Option<String>,
    pub score: f64,
    pub duration: f64,
    pub created_at: NaiveDateTime,
}
