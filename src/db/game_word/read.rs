use sqlx::{PgExecutor, query_as};

use crate::errors::AppError;
use crate::models::GameWord;

/// Every recorded turn of a game, oldest first.
pub async fn for_game<'e, E>(ex: E, game_id: &str) -> Result<Vec<GameWord>, AppError>
where
    E: PgExecutor<'e>,
{
    let words = query_as::<_, GameWord>(
        "SELECT * FROM game_word WHERE game_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(game_id)
    .fetch_all(ex)
    .await?;

    Ok(words)
}

/// Whether a word has already been accepted in this game.
pub async fn exists<'e, E>(ex: E, game_id: &str, word: &str) -> Result<bool, AppError>
where
    E: PgExecutor<'e>,
{
    let exists: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM game_word WHERE game_id = $1 AND word = $2)",
    )
    .bind(game_id)
    .bind(word)
    .fetch_one(ex)
    .await?;

    Ok(exists.0)
}
