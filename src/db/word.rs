use sqlx::PgPool;

use crate::errors::AppError;

/// Replace a locale's persisted dictionary with the given word list.
/// Runs in one transaction so lookups never observe a half-loaded locale.
pub async fn replace_locale(
    pool: &PgPool,
    locale: &str,
    words: &[String],
) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM word WHERE locale = $1")
        .bind(locale)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query(
        r#"
        INSERT INTO word (word, locale)
        SELECT LOWER(TRIM(w)), $2 FROM UNNEST($1::TEXT[]) AS w
        WHERE TRIM(w) <> ''
        ON CONFLICT (word, locale) DO NOTHING
        "#,
    )
    .bind(words)
    .bind(locale)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(result.rows_affected())
}

/// All words of a locale, lowercase.
pub async fn for_locale(pool: &PgPool, locale: &str) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT word FROM word WHERE locale = $1")
        .bind(locale)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(w,)| w).collect())
}

/// Locales that have at least one persisted word.
pub async fn locales(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT locale FROM word")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(l,)| l).collect())
}
