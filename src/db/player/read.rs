use sqlx::{PgConnection, PgExecutor, query_as};

use crate::errors::AppError;
use crate::models::Player;

pub async fn find_by_id<'e, E>(ex: E, player_id: &str) -> Result<Option<Player>, AppError>
where
    E: PgExecutor<'e>,
{
    let player = query_as::<_, Player>("SELECT * FROM player WHERE id = $1")
        .bind(player_id)
        .fetch_optional(ex)
        .await?;

    Ok(player)
}

pub async fn find_by_session<'e, E>(
    ex: E,
    game_id: &str,
    session_key: &str,
) -> Result<Option<Player>, AppError>
where
    E: PgExecutor<'e>,
{
    let player =
        query_as::<_, Player>("SELECT * FROM player WHERE game_id = $1 AND session_key = $2")
            .bind(game_id)
            .bind(session_key)
            .fetch_optional(ex)
            .await?;

    Ok(player)
}

/// Lock a player row for the remainder of the transaction. The disconnect
/// cleanup job uses this to re-check `is_connected` before deleting.
pub async fn lock_by_id(
    conn: &mut PgConnection,
    player_id: &str,
) -> Result<Option<Player>, AppError> {
    let player = query_as::<_, Player>("SELECT * FROM player WHERE id = $1 FOR UPDATE")
        .bind(player_id)
        .fetch_optional(conn)
        .await?;

    Ok(player)
}

/// Non-spectator players in join order. This is the turn rotation:
/// `current_player = participants[current_turn % len]`.
pub async fn participants<'e, E>(ex: E, game_id: &str) -> Result<Vec<Player>, AppError>
where
    E: PgExecutor<'e>,
{
    let players = query_as::<_, Player>(
        r#"
        SELECT * FROM player
        WHERE game_id = $1 AND type <> 'SPECTATOR'
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(game_id)
    .fetch_all(ex)
    .await?;

    Ok(players)
}

/// Every player of a game, spectators included, in join order.
pub async fn all<'e, E>(ex: E, game_id: &str) -> Result<Vec<Player>, AppError>
where
    E: PgExecutor<'e>,
{
    let players =
        query_as::<_, Player>("SELECT * FROM player WHERE game_id = $1 ORDER BY created_at ASC, id ASC")
            .bind(game_id)
            .fetch_all(ex)
            .await?;

    Ok(players)
}
