use sqlx::PgConnection;

use crate::errors::AppError;

/// Remove a player row. Foreign keys null out any `current_player` or
/// `winner` reference and detach their recorded words.
pub async fn delete(conn: &mut PgConnection, player_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM player WHERE id = $1")
        .bind(player_id)
        .execute(conn)
        .await?;

    Ok(())
}
