use sqlx::PgConnection;

use crate::errors::AppError;
use crate::models::Game;

/// Insert a fresh WAITING game seeded with a single random letter.
pub async fn insert(
    conn: &mut PgConnection,
    id: &str,
    settings_id: &str,
    seed_letter: &str,
) -> Result<Game, AppError> {
    let game = sqlx::query_as::<_, Game>(
        r#"
        INSERT INTO game (id, settings_id, last_word)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(settings_id)
    .bind(seed_letter)
    .fetch_one(conn)
    .await?;

    Ok(game)
}
