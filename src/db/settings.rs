use sqlx::{PgConnection, PgExecutor, query_as};

use crate::errors::AppError;
use crate::ids;
use crate::models::{GameSettings, SettingsUpdate};

/// Create a settings row with the schema defaults.
pub async fn create_default(conn: &mut PgConnection) -> Result<GameSettings, AppError> {
    let settings =
        query_as::<_, GameSettings>("INSERT INTO game_settings (id) VALUES ($1) RETURNING *")
            .bind(ids::entity_id())
            .fetch_one(conn)
            .await?;

    Ok(settings)
}

pub async fn get<'e, E>(ex: E, settings_id: &str) -> Result<GameSettings, AppError>
where
    E: PgExecutor<'e>,
{
    let settings = query_as::<_, GameSettings>("SELECT * FROM game_settings WHERE id = $1")
        .bind(settings_id)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| AppError::Database(format!("Settings {} missing", settings_id)))?;

    Ok(settings)
}

/// Apply host overrides, leaving untouched fields at their current value.
/// Range validation happens in `SettingsUpdate::validate`; the schema's
/// CHECK constraints are the backstop.
pub async fn apply(
    conn: &mut PgConnection,
    settings_id: &str,
    update: &SettingsUpdate,
) -> Result<GameSettings, AppError> {
    let settings = query_as::<_, GameSettings>(
        r#"
        UPDATE game_settings
        SET locale = COALESCE($2, locale),
            word_length = COALESCE($3, word_length),
            turn_time = COALESCE($4, turn_time),
            max_turns = COALESCE($5, max_turns)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(settings_id)
    .bind(&update.locale)
    .bind(update.word_length)
    .bind(update.turn_time)
    .bind(update.max_turns)
    .fetch_one(conn)
    .await?;

    Ok(settings)
}
