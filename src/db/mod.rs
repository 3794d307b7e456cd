pub mod game;
pub mod game_word;
pub mod player;
pub mod settings;
pub mod word;

mod retry;
pub use retry::with_retries;

use sqlx::{PgPool, Postgres, Transaction};

use crate::errors::AppError;

/// Open a serializable transaction. Every rules-engine mutation runs inside
/// one of these; serialization failures surface as `AppError::Retriable`.
pub async fn begin_serializable(pool: &PgPool) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}
