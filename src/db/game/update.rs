use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Game;

/// Persist the mutable columns of a locked game row.
pub async fn save(conn: &mut PgConnection, game: &Game) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE game
        SET status = $2,
            current_turn = $3,
            current_player_id = $4,
            winner_id = $5,
            turn_time_left = $6,
            last_word = $7,
            task_id = $8,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(&game.id)
    .bind(game.status)
    .bind(game.current_turn)
    .bind(&game.current_player_id)
    .bind(&game.winner_id)
    .bind(game.turn_time_left)
    .bind(&game.last_word)
    .bind(game.task_id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Claim the game's timer loop: compare-and-swap `task_id` from NULL.
/// Returns false when another driver already owns the game.
pub async fn claim_task(pool: &PgPool, game_id: &str, task_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE game SET task_id = $2 WHERE id = $1 AND task_id IS NULL AND status = 'PLAYING'",
    )
    .bind(game_id)
    .bind(task_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Release the timer loop claim so a later driver can take over.
pub async fn release_task(pool: &PgPool, game_id: &str, task_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE game SET task_id = NULL WHERE id = $1 AND task_id = $2")
        .bind(game_id)
        .bind(task_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Burn one second off the turn clock. Returns the remaining seconds, or
/// None when the game is no longer PLAYING or the claim was lost.
pub async fn tick(pool: &PgPool, game_id: &str, task_id: Uuid) -> Result<Option<i32>, AppError> {
    let left: Option<(i32,)> = sqlx::query_as(
        r#"
        UPDATE game
        SET turn_time_left = turn_time_left - 1, updated_at = NOW()
        WHERE id = $1 AND task_id = $2 AND status = 'PLAYING'
        RETURNING turn_time_left
        "#,
    )
    .bind(game_id)
    .bind(task_id)
    .fetch_optional(pool)
    .await?;

    Ok(left.map(|(v,)| v))
}
