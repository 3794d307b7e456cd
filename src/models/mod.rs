pub mod game;
pub mod player;
pub mod settings;
pub mod word;

pub use game::{Game, GameDetail, GameStatus, LeaderboardEntry};
pub use player::{Player, PlayerSummary, PlayerType};
pub use settings::{GameSettings, SettingsUpdate};
pub use word::GameWord;
