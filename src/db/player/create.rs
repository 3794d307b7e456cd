use sqlx::PgConnection;

use crate::errors::AppError;
use crate::models::{Player, PlayerType};

/// Insert a player. Name and session-key uniqueness within the game is
/// enforced by the schema and surfaces as `AppError::Conflict`.
pub async fn insert(
    conn: &mut PgConnection,
    id: &str,
    game_id: &str,
    name: &str,
    player_type: PlayerType,
    session_key: Option<&str>,
) -> Result<Player, AppError> {
    let player = sqlx::query_as::<_, Player>(
        r#"
        INSERT INTO player (id, game_id, name, type, session_key)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(game_id)
    .bind(name)
    .bind(player_type)
    .bind(session_key)
    .fetch_one(conn)
    .await?;

    Ok(player)
}
