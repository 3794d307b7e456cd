//! The authority over legal game-state transitions.
//!
//! Every public operation runs inside a single serializable transaction
//! that locks the game row first, so concurrent commands and the turn
//! driver serialize per game. Transient contention is retried here;
//! rule violations never are.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::db::{begin_serializable, game as game_db, game_word as game_word_db,
    player as player_db, settings as settings_db, with_retries};
use crate::dictionary::Dictionary;
use crate::errors::AppError;
use crate::ids;
use crate::models::{
    Game, GameDetail, GameSettings, GameStatus, LeaderboardEntry, Player, PlayerSummary,
    PlayerType, SettingsUpdate,
};

pub mod driver;
pub mod scorer;

#[derive(Clone)]
pub struct RulesEngine {
    pool: PgPool,
    dictionary: Dictionary,
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub player: PlayerSummary,
    pub game: GameDetail,
}

#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub player: PlayerSummary,
    pub game: GameDetail,
    /// True when this departure ended the game.
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub game: GameDetail,
    /// True when this turn ended the game.
    pub finished: bool,
}

impl RulesEngine {
    pub fn new(pool: PgPool, dictionary: Dictionary) -> Self {
        Self { pool, dictionary }
    }

    /// Create a game in WAITING with default settings and a random seed letter.
    pub async fn create_game(&self) -> Result<GameDetail, AppError> {
        with_retries(|| self.create_game_once()).await
    }

    /// Add a player to a WAITING game. The first participant becomes HOST.
    pub async fn join(
        &self,
        game_id: &str,
        name: &str,
        session_key: &str,
    ) -> Result<JoinOutcome, AppError> {
        with_retries(|| self.join_once(game_id, name, session_key)).await
    }

    /// Remove the player identified by `session_key` from the game.
    pub async fn leave(&self, game_id: &str, session_key: &str) -> Result<LeaveOutcome, AppError> {
        with_retries(|| self.leave_once(game_id, session_key)).await
    }

    /// Remove a player by id, but only if they are still disconnected.
    /// Run by the disconnect grace job; `None` means nothing was removed.
    pub async fn leave_player(&self, player_id: &str) -> Result<Option<LeaveOutcome>, AppError> {
        with_retries(|| self.leave_player_once(player_id)).await
    }

    /// Validate that the host may start the game and apply setting overrides.
    /// Does not change the game status.
    pub async fn prepare_start(
        &self,
        game_id: &str,
        session_key: &str,
        overrides: &SettingsUpdate,
    ) -> Result<(), AppError> {
        with_retries(|| self.prepare_start_once(game_id, session_key, overrides)).await
    }

    /// Transition WAITING -> PLAYING: host takes the first turn and the
    /// turn clock is armed.
    pub async fn start(
        &self,
        game_id: &str,
        session_key: Option<&str>,
    ) -> Result<GameDetail, AppError> {
        with_retries(|| self.start_once(game_id, session_key)).await
    }

    /// Submit a word for the caller's turn.
    pub async fn submit_turn(
        &self,
        game_id: &str,
        session_key: &str,
        word: &str,
        duration: f64,
    ) -> Result<TurnOutcome, AppError> {
        with_retries(|| self.submit_turn_once(game_id, session_key, word, duration)).await
    }

    /// Charge the current player with a timeout. Only the turn driver
    /// holding the game's task claim may call this.
    pub async fn force_timeout(
        &self,
        game_id: &str,
        task_id: Uuid,
    ) -> Result<TurnOutcome, AppError> {
        with_retries(|| self.force_timeout_once(game_id, task_id)).await
    }

    /// Reset a FINISHED game so the same party can play again. Host only.
    pub async fn restart(&self, game_id: &str, session_key: &str) -> Result<GameDetail, AppError> {
        with_retries(|| self.restart_once(game_id, session_key)).await
    }

    /// Top of the leaderboard of a FINISHED game.
    pub async fn get_winner(&self, game_id: &str) -> Result<Option<LeaderboardEntry>, AppError> {
        let games = game_db::GameRepository::new(self.pool.clone());
        let game = games.get_by_id(game_id).await?;
        if !game.is_finished() {
            return Err(AppError::Invalid(
                "Cannot get winner of a game that is not finished".to_string(),
            ));
        }
        Ok(games.leaderboard(game_id).await?.into_iter().next())
    }

    async fn detail(&self, game_id: &str) -> Result<GameDetail, AppError> {
        game_db::GameRepository::new(self.pool.clone())
            .detail(game_id)
            .await
    }

    async fn create_game_once(&self) -> Result<GameDetail, AppError> {
        let mut tx = begin_serializable(&self.pool).await?;
        let settings = settings_db::create_default(&mut tx).await?;
        let game =
            game_db::create::insert(&mut tx, &ids::game_id(), &settings.id, &ids::seed_letter())
                .await?;
        tx.commit().await?;

        self.detail(&game.id).await
    }

    async fn join_once(
        &self,
        game_id: &str,
        name: &str,
        session_key: &str,
    ) -> Result<JoinOutcome, AppError> {
        let name = Player::validate_name(name)?;

        let mut tx = begin_serializable(&self.pool).await?;
        let game = lock_game(&mut tx, game_id).await?;
        if game.status != GameStatus::Waiting {
            return Err(AppError::Invalid(
                "Game has already started or is finished".to_string(),
            ));
        }

        let participants = player_db::read::participants(&mut *tx, game_id).await?;
        let player_type = if participants.is_empty() {
            PlayerType::Host
        } else {
            PlayerType::Human
        };

        let player = player_db::create::insert(
            &mut tx,
            &ids::entity_id(),
            game_id,
            name,
            player_type,
            Some(session_key),
        )
        .await?;
        tx.commit().await?;

        Ok(JoinOutcome {
            player: player.summary(),
            game: self.detail(game_id).await?,
        })
    }

    async fn leave_once(
        &self,
        game_id: &str,
        session_key: &str,
    ) -> Result<LeaveOutcome, AppError> {
        let mut tx = begin_serializable(&self.pool).await?;
        let mut game = lock_game(&mut tx, game_id).await?;
        let player = player_db::read::find_by_session(&mut *tx, game_id, session_key)
            .await?
            .ok_or_else(|| AppError::NotFound("You are not in this game".to_string()))?;

        let finished = remove_player(&mut tx, &mut game, &player).await?;
        tx.commit().await?;

        Ok(LeaveOutcome {
            player: player.summary(),
            game: self.detail(game_id).await?,
            finished,
        })
    }

    async fn leave_player_once(&self, player_id: &str) -> Result<Option<LeaveOutcome>, AppError> {
        // Cheap probe before taking any locks.
        let Some(probe) = player_db::read::find_by_id(&self.pool, player_id).await? else {
            return Ok(None);
        };
        if probe.is_connected {
            return Ok(None);
        }

        let Some(game_id) = probe.game_id.clone() else {
            // Never seated in a game; just clean up the row.
            let mut tx = begin_serializable(&self.pool).await?;
            player_db::delete::delete(&mut tx, player_id).await?;
            tx.commit().await?;
            return Ok(None);
        };

        let mut tx = begin_serializable(&self.pool).await?;
        let mut game = lock_game(&mut tx, &game_id).await?;
        // Re-check under the game lock: a reconnect may have raced the job.
        let Some(player) = player_db::read::lock_by_id(&mut tx, player_id).await? else {
            return Ok(None);
        };
        if player.is_connected {
            return Ok(None);
        }

        let finished = remove_player(&mut tx, &mut game, &player).await?;
        tx.commit().await?;

        Ok(Some(LeaveOutcome {
            player: player.summary(),
            game: self.detail(&game_id).await?,
            finished,
        }))
    }

    async fn prepare_start_once(
        &self,
        game_id: &str,
        session_key: &str,
        overrides: &SettingsUpdate,
    ) -> Result<(), AppError> {
        overrides.validate()?;

        let mut tx = begin_serializable(&self.pool).await?;
        let game = lock_game(&mut tx, game_id).await?;
        if game.status != GameStatus::Waiting {
            return Err(AppError::Invalid(
                "Cannot start a game that is not waiting".to_string(),
            ));
        }

        let participants = player_db::read::participants(&mut *tx, game_id).await?;
        require_host(&participants, session_key, "start")?;
        if participants.len() < 2 {
            return Err(AppError::Invalid(
                "Cannot start a game with less than 2 players".to_string(),
            ));
        }

        if !overrides.is_empty() {
            settings_db::apply(&mut tx, &game.settings_id, overrides).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn start_once(
        &self,
        game_id: &str,
        session_key: Option<&str>,
    ) -> Result<GameDetail, AppError> {
        let mut tx = begin_serializable(&self.pool).await?;
        let mut game = lock_game(&mut tx, game_id).await?;
        if game.status != GameStatus::Waiting {
            return Err(AppError::Invalid(
                "Cannot start a game that is not waiting".to_string(),
            ));
        }

        let participants = player_db::read::participants(&mut *tx, game_id).await?;
        if let Some(session_key) = session_key {
            require_host(&participants, session_key, "start")?;
        }
        if participants.len() < 2 {
            return Err(AppError::Invalid(
                "Cannot start a game with less than 2 players".to_string(),
            ));
        }

        let host = participants
            .iter()
            .find(|p| p.player_type == PlayerType::Host)
            .ok_or_else(|| AppError::Invalid("Game has no host".to_string()))?;
        let settings = settings_db::get(&mut *tx, &game.settings_id).await?;

        game.status = GameStatus::Playing;
        game.current_turn = 0;
        game.current_player_id = Some(host.id.clone());
        game.turn_time_left = settings.turn_time;
        // A stale claim from a previous run must not block the new driver.
        game.task_id = None;
        game_db::update::save(&mut tx, &game).await?;
        tx.commit().await?;

        self.detail(game_id).await
    }

    async fn submit_turn_once(
        &self,
        game_id: &str,
        session_key: &str,
        word: &str,
        duration: f64,
    ) -> Result<TurnOutcome, AppError> {
        let mut tx = begin_serializable(&self.pool).await?;
        let mut game = lock_game(&mut tx, game_id).await?;
        let settings = settings_db::get(&mut *tx, &game.settings_id).await?;
        let participants = player_db::read::participants(&mut *tx, game_id).await?;
        let current = resolve_current_player(&participants, &game)?;

        if current.session_key.as_deref() != Some(session_key) {
            return Err(AppError::Invalid("It is not your turn".to_string()));
        }
        if game.turn_time_left <= 0 {
            return Err(AppError::Invalid("Turn time has expired".to_string()));
        }

        let word = word.trim().to_lowercase();
        validate_word(&mut tx, &game, &settings, &self.dictionary, &word).await?;
        let score = scorer::calculate_score(&word, duration);

        let finished = apply_turn(
            &mut tx,
            &mut game,
            &settings,
            &participants,
            current,
            Some(word),
            score,
            duration,
        )
        .await?;
        tx.commit().await?;

        Ok(TurnOutcome {
            game: self.detail(game_id).await?,
            finished,
        })
    }

    async fn force_timeout_once(
        &self,
        game_id: &str,
        task_id: Uuid,
    ) -> Result<TurnOutcome, AppError> {
        let mut tx = begin_serializable(&self.pool).await?;
        let mut game = lock_game(&mut tx, game_id).await?;
        if game.task_id != Some(task_id) {
            return Err(AppError::Invalid(
                "Turn driver no longer owns this game".to_string(),
            ));
        }

        let settings = settings_db::get(&mut *tx, &game.settings_id).await?;
        let participants = player_db::read::participants(&mut *tx, game_id).await?;
        let current = resolve_current_player(&participants, &game)?;

        let duration = f64::from(settings.turn_time);
        let score = scorer::timeout_score(duration);

        let finished = apply_turn(
            &mut tx,
            &mut game,
            &settings,
            &participants,
            current,
            None,
            score,
            duration,
        )
        .await?;
        tx.commit().await?;

        Ok(TurnOutcome {
            game: self.detail(game_id).await?,
            finished,
        })
    }

    async fn restart_once(
        &self,
        game_id: &str,
        session_key: &str,
    ) -> Result<GameDetail, AppError> {
        let mut tx = begin_serializable(&self.pool).await?;
        let mut game = lock_game(&mut tx, game_id).await?;
        if game.status != GameStatus::Finished {
            return Err(AppError::Invalid(
                "Only a finished game can be restarted".to_string(),
            ));
        }

        let participants = player_db::read::participants(&mut *tx, game_id).await?;
        require_host(&participants, session_key, "restart")?;

        game_word_db::delete::clear(&mut tx, game_id).await?;
        game.status = GameStatus::Waiting;
        game.current_turn = 0;
        game.current_player_id = None;
        game.winner_id = None;
        game.turn_time_left = 0;
        game.last_word = Some(ids::seed_letter());
        game.task_id = None;
        game_db::update::save(&mut tx, &game).await?;
        tx.commit().await?;

        self.detail(game_id).await
    }
}

/// Lock the game row or report the game as unknown.
async fn lock_game(conn: &mut PgConnection, game_id: &str) -> Result<Game, AppError> {
    game_db::read::lock(conn, game_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game {} not found", game_id)))
}

fn require_host(
    participants: &[Player],
    session_key: &str,
    action: &str,
) -> Result<(), AppError> {
    let host = participants
        .iter()
        .find(|p| p.player_type == PlayerType::Host)
        .ok_or_else(|| AppError::Invalid("Game has no host".to_string()))?;
    if host.session_key.as_deref() != Some(session_key) {
        return Err(AppError::Invalid(format!(
            "Only the host can {} the game",
            action
        )));
    }
    Ok(())
}

fn resolve_current_player<'a>(
    participants: &'a [Player],
    game: &Game,
) -> Result<&'a Player, AppError> {
    if game.status != GameStatus::Playing {
        return Err(AppError::Invalid("Game is not in progress".to_string()));
    }
    let current_id = game
        .current_player_id
        .as_deref()
        .ok_or_else(|| AppError::Database("Playing game has no current player".to_string()))?;
    participants
        .iter()
        .find(|p| p.id == current_id)
        .ok_or_else(|| {
            AppError::Database("Current player is not a participant of this game".to_string())
        })
}

/// Invariant checks for an accepted word: chains from the last word, unseen
/// in this game, long enough, and present in the locale's dictionary.
async fn validate_word(
    conn: &mut PgConnection,
    game: &Game,
    settings: &GameSettings,
    dictionary: &Dictionary,
    word: &str,
) -> Result<(), AppError> {
    if word.is_empty() {
        return Err(AppError::Invalid(
            "A word is required to take a turn".to_string(),
        ));
    }
    if let Some(expected) = game.chain_letter() {
        if !word.starts_with(expected) {
            return Err(AppError::Invalid(format!(
                "Word must start with '{}'",
                expected
            )));
        }
    }
    if game_word_db::read::exists(&mut *conn, &game.id, word).await? {
        return Err(AppError::Invalid(format!(
            "'{}' has already been played in this game",
            word
        )));
    }
    if (word.chars().count() as i32) < settings.word_length {
        return Err(AppError::Invalid(format!(
            "Word must be at least {} letters long",
            settings.word_length
        )));
    }
    if !dictionary.contains(word, &settings.locale) {
        return Err(AppError::Invalid(format!(
            "'{}' is not a word in the '{}' dictionary",
            word, settings.locale
        )));
    }
    Ok(())
}

/// Record the resolved turn and either advance the rotation or finish the
/// game once the turn cap is exhausted.
#[allow(clippy::too_many_arguments)]
async fn apply_turn(
    conn: &mut PgConnection,
    game: &mut Game,
    settings: &GameSettings,
    participants: &[Player],
    current: &Player,
    word: Option<String>,
    score: f64,
    duration: f64,
) -> Result<bool, AppError> {
    game_word_db::create::insert(
        conn,
        &ids::entity_id(),
        &game.id,
        &current.id,
        word.as_deref(),
        score,
        duration,
    )
    .await?;

    if let Some(word) = word {
        game.last_word = Some(word);
    }

    let finished = game.current_turn + 1 > settings.max_turns;
    if finished {
        game.status = GameStatus::Finished;
        game.winner_id = game_db::read::leaderboard(&mut *conn, &game.id)
            .await?
            .first()
            .map(|entry| entry.id.clone());
    } else {
        game.current_turn += 1;
        let index = game.current_turn as usize % participants.len();
        game.current_player_id = Some(participants[index].id.clone());
        game.turn_time_left = settings.turn_time;
    }
    game_db::update::save(conn, game).await?;

    Ok(finished)
}

/// Delete a player and repair the game around the hole they left: promote
/// a new host, end the game when under quorum, and keep `current_player`
/// pointing at a participant. Returns true when the game finished here.
async fn remove_player(
    conn: &mut PgConnection,
    game: &mut Game,
    departed: &Player,
) -> Result<bool, AppError> {
    let was_finished = game.is_finished();

    player_db::delete::delete(conn, &departed.id).await?;
    if game.current_player_id.as_deref() == Some(departed.id.as_str()) {
        game.current_player_id = None;
    }
    if game.winner_id.as_deref() == Some(departed.id.as_str()) {
        game.winner_id = None;
    }

    let remaining = player_db::read::participants(&mut *conn, &game.id).await?;

    if departed.player_type == PlayerType::Host {
        match remaining.first() {
            Some(next) => {
                player_db::update::set_type(&mut *conn, &next.id, PlayerType::Host).await?
            }
            None => game.status = GameStatus::Finished,
        }
    }

    if game.status == GameStatus::Playing {
        if remaining.len() < 2 {
            game.status = GameStatus::Finished;
            game.current_player_id = None;
            game.winner_id = game_db::read::leaderboard(&mut *conn, &game.id)
                .await?
                .first()
                .map(|entry| entry.id.clone());
        } else if game.current_player_id.is_none() {
            let index = game.current_turn as usize % remaining.len();
            game.current_player_id = Some(remaining[index].id.clone());
        }
    }

    game_db::update::save(conn, game).await?;

    Ok(!was_finished && game.is_finished())
}
