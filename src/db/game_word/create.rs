use sqlx::PgConnection;

use crate::errors::AppError;
use crate::models::GameWord;

/// Record a resolved turn. `word = None` records a timeout.
pub async fn insert(
    conn: &mut PgConnection,
    id: &str,
    game_id: &str,
    player_id: &str,
    word: Option<&str>,
    score: f64,
    duration: f64,
) -> Result<GameWord, AppError> {
    let game_word = sqlx::query_as::<_, GameWord>(
        r#"
        INSERT INTO game_word (id, game_id, player_id, word, score, duration)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(game_id)
    .bind(player_id)
    .bind(word)
    .bind(score)
    .bind(duration)
    .fetch_one(conn)
    .await?;

    Ok(game_word)
}
