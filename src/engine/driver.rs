//! Per-game turn driver: the authoritative timer loop.
//!
//! Exactly one driver may own a PLAYING game at a time, guarded by a
//! compare-and-swap on the game's `task_id`. The driver decrements the
//! turn clock once per second, publishes a tick, and charges the current
//! player with a timeout when the clock hits zero.

use std::time::Duration;

use uuid::Uuid;

use crate::db::game as game_db;
use crate::errors::AppError;
use crate::state::AppState;
use crate::ws::{self, messages::GameEvent};

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const MAX_TICK_FAILURES: u32 = 3;

/// Launch the driver for a game that just started.
pub fn spawn(state: &AppState, game_id: String) {
    let state = state.clone();
    tokio::spawn(async move {
        run(state, game_id).await;
    });
}

pub async fn run(state: AppState, game_id: String) {
    let task_id = Uuid::new_v4();

    match game_db::update::claim_task(&state.postgres, &game_id, task_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(%game_id, "another turn driver already owns this game");
            return;
        }
        Err(e) => {
            tracing::error!(%game_id, error = %e, "failed to claim turn driver task");
            return;
        }
    }

    tracing::info!(%game_id, %task_id, "turn driver started");
    let engine = state.engine();
    let mut failures = 0u32;

    loop {
        tokio::time::sleep(TICK_INTERVAL).await;

        let time_left = match game_db::update::tick(&state.postgres, &game_id, task_id).await {
            Ok(Some(left)) => {
                failures = 0;
                left
            }
            // Game finished elsewhere, or the claim was lost.
            Ok(None) => break,
            Err(e) => {
                failures += 1;
                tracing::warn!(%game_id, error = %e, "turn tick failed");
                if failures >= MAX_TICK_FAILURES {
                    break;
                }
                continue;
            }
        };

        state
            .bus
            .publish(&game_id, GameEvent::turn_tick(time_left))
            .await;

        if time_left <= 0 {
            match engine.force_timeout(&game_id, task_id).await {
                Ok(outcome) => {
                    ws::publish_outcome(&state, &outcome.game, outcome.finished).await;
                    if outcome.finished {
                        break;
                    }
                }
                Err(AppError::Invalid(reason)) => {
                    tracing::debug!(%game_id, %reason, "turn driver lost authority");
                    break;
                }
                Err(e) => {
                    tracing::error!(%game_id, error = %e, "forced timeout failed");
                    break;
                }
            }
        }
    }

    if let Err(e) = game_db::update::release_task(&state.postgres, &game_id, task_id).await {
        tracing::warn!(%game_id, error = %e, "failed to release turn driver task");
    }
    tracing::info!(%game_id, "turn driver stopped");
}
