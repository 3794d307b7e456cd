use sqlx::PgPool;

/// Game repository for pool-scoped reads (backed by the `game` table).
/// Transaction-scoped reads and writes live as free functions in the
/// submodules and take an explicit connection.
pub struct GameRepository {
    pool: PgPool,
}

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub mod create;
pub mod read;
pub mod update;
