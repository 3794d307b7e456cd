use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::dictionary::Dictionary;
use crate::engine::RulesEngine;
use crate::errors::AppError;
use crate::ws::EventBus;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| AppError::Env("DATABASE_URL is not set".to_string()))?;
        let debug = std::env::var("DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            debug,
        })
    }

    /// How long a disconnected player keeps their seat before cleanup.
    pub fn disconnect_grace(&self) -> Duration {
        if self.debug {
            Duration::from_secs(5)
        } else {
            Duration::from_secs(60)
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub postgres: PgPool,
    pub dictionary: Dictionary,
    pub bus: EventBus,
}

impl AppState {
    /// Create a new AppState by connecting to PostgreSQL
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::from_env()?;

        let postgres = PgPoolOptions::new()
            .max_connections(50)
            .min_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await?;

        Ok(Self {
            config,
            postgres,
            dictionary: Dictionary::default(),
            bus: EventBus::default(),
        })
    }

    /// The rules engine is stateless; hand out a fresh handle per use.
    pub fn engine(&self) -> RulesEngine {
        RulesEngine::new(self.postgres.clone(), self.dictionary.clone())
    }
}
