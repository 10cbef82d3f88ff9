pub mod leaderboard;
pub mod models;
pub mod repository;

pub use leaderboard::{Leaderboard, LeaderboardEntry, SortKey};
pub use models::ScoreRecord;
pub use repository::{InMemoryScoreRepository, JsonFileScoreRepository, ScoreRepository};
