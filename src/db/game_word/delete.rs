use sqlx::PgConnection;

use crate::errors::AppError;

/// Wipe a game's move history (restart).
pub async fn clear(conn: &mut PgConnection, game_id: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM game_word WHERE game_id = $1")
        .bind(game_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}
