use sqlx::{PgConnection, PgExecutor, query_as};

use crate::errors::AppError;
use crate::models::{Player, PlayerType};

/// Promote or demote a player (host reassignment after the host leaves).
pub async fn set_type(
    conn: &mut PgConnection,
    player_id: &str,
    player_type: PlayerType,
) -> Result<(), AppError> {
    sqlx::query("UPDATE player SET type = $2, updated_at = NOW() WHERE id = $1")
        .bind(player_id)
        .bind(player_type)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn set_connected<'e, E>(
    ex: E,
    player_id: &str,
    is_connected: bool,
) -> Result<Option<Player>, AppError>
where
    E: PgExecutor<'e>,
{
    let player = query_as::<_, Player>(
        r#"
        UPDATE player
        SET is_connected = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(player_id)
    .bind(is_connected)
    .fetch_optional(ex)
    .await?;

    Ok(player)
}
