use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::Player;

/// Player repository for pool-scoped lookups (backed by the `player` table).
/// Transaction-scoped writes live in the submodules.
pub struct PlayerRepository {
    pool: PgPool,
}

impl PlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, player_id: &str) -> Result<Option<Player>, AppError> {
        read::find_by_id(&self.pool, player_id).await
    }

    /// Resolve a player by the session cookie it presented on connect.
    pub async fn find_by_session(
        &self,
        game_id: &str,
        session_key: &str,
    ) -> Result<Option<Player>, AppError> {
        read::find_by_session(&self.pool, game_id, session_key).await
    }

    /// Players of a game in join order, optionally without spectators.
    pub async fn players(
        &self,
        game_id: &str,
        exclude_spectators: bool,
    ) -> Result<Vec<Player>, AppError> {
        if exclude_spectators {
            read::participants(&self.pool, game_id).await
        } else {
            read::all(&self.pool, game_id).await
        }
    }

    /// Flip the connection flag, returning the updated player if it exists.
    pub async fn set_connected(
        &self,
        player_id: &str,
        is_connected: bool,
    ) -> Result<Option<Player>, AppError> {
        update::set_connected(&self.pool, player_id, is_connected).await
    }
}

pub mod create;
pub mod delete;
pub mod read;
pub mod update;
