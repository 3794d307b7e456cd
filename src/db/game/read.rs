use sqlx::{PgConnection, PgExecutor, query_as};

use super::GameRepository;
use crate::db::{game_word, player, settings};
use crate::errors::AppError;
use crate::models::{Game, GameDetail, LeaderboardEntry};

impl GameRepository {
    /// Find a game by its ID.
    pub async fn find_by_id(&self, game_id: &str) -> Result<Option<Game>, AppError> {
        find_by_id(&self.pool, game_id).await
    }

    /// Get a game by ID or return `AppError::NotFound`.
    pub async fn get_by_id(&self, game_id: &str) -> Result<Game, AppError> {
        self.find_by_id(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))
    }

    /// Find a game that is still live (WAITING or PLAYING).
    pub async fn find_active(&self, game_id: &str) -> Result<Option<Game>, AppError> {
        let game = query_as::<_, Game>("SELECT * FROM game WHERE id = $1 AND status <> 'FINISHED'")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(game)
    }

    /// Find a WAITING game with enough participants to start.
    pub async fn find_startable(&self, game_id: &str) -> Result<Option<Game>, AppError> {
        let game = query_as::<_, Game>(
            r#"
            SELECT g.* FROM game g
            WHERE g.id = $1
              AND g.status = 'WAITING'
              AND (SELECT COUNT(*) FROM player p
                   WHERE p.game_id = g.id AND p.type <> 'SPECTATOR') >= 2
            "#,
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    /// List games that have not finished, newest first.
    pub async fn list_active(&self) -> Result<Vec<Game>, AppError> {
        let games = query_as::<_, Game>(
            "SELECT * FROM game WHERE status <> 'FINISHED' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    pub async fn leaderboard(&self, game_id: &str) -> Result<Vec<LeaderboardEntry>, AppError> {
        leaderboard(&self.pool, game_id).await
    }

    /// Assemble the full client-facing view of a game.
    pub async fn detail(&self, game_id: &str) -> Result<GameDetail, AppError> {
        let game = self.get_by_id(game_id).await?;

        let (settings, players, words, leaderboard) = tokio::join!(
            settings::get(&self.pool, &game.settings_id),
            player::read::all(&self.pool, game_id),
            game_word::read::for_game(&self.pool, game_id),
            leaderboard(&self.pool, game_id),
        );

        Ok(GameDetail {
            id: game.id,
            status: game.status,
            current_turn: game.current_turn,
            current_player_id: game.current_player_id,
            winner_id: game.winner_id,
            turn_time_left: game.turn_time_left,
            last_word: game.last_word,
            settings: settings?,
            players: players?.iter().map(|p| p.summary()).collect(),
            words: words?,
            leaderboard: leaderboard?,
            created_at: game.created_at,
        })
    }
}

pub async fn find_by_id<'e, E>(ex: E, game_id: &str) -> Result<Option<Game>, AppError>
where
    E: PgExecutor<'e>,
{
    let game = query_as::<_, Game>("SELECT * FROM game WHERE id = $1")
        .bind(game_id)
        .fetch_optional(ex)
        .await?;

    Ok(game)
}

/// Lock a game row for the remainder of the transaction. All per-game
/// mutations funnel through this lock.
pub async fn lock(conn: &mut PgConnection, game_id: &str) -> Result<Option<Game>, AppError> {
    let game = query_as::<_, Game>("SELECT * FROM game WHERE id = $1 FOR UPDATE")
        .bind(game_id)
        .fetch_optional(conn)
        .await?;

    Ok(game)
}

/// Participants ranked by the sum of their word scores, descending;
/// ties broken by earliest join.
pub async fn leaderboard<'e, E>(ex: E, game_id: &str) -> Result<Vec<LeaderboardEntry>, AppError>
where
    E: PgExecutor<'e>,
{
    let entries = query_as::<_, LeaderboardEntry>(
        r#"
        SELECT p.id, p.name, COALESCE(SUM(gw.score), 0)::DOUBLE PRECISION AS score
        FROM player p
        LEFT JOIN game_word gw ON gw.player_id = p.id AND gw.game_id = p.game_id
        WHERE p.game_id = $1 AND p.type <> 'SPECTATOR'
        GROUP BY p.id, p.name, p.created_at
        ORDER BY score DESC, p.created_at ASC
        "#,
    )
    .bind(game_id)
    .fetch_all(ex)
    .await?;

    Ok(entries)
}
