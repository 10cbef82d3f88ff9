pub mod models;
pub mod repository;
pub mod service;

pub use models::{DailyChallenge, DailyCompletion, DailyLeaderboardEntry, DailyResult, DailyStats};
pub use repository::{DailyRepository, InMemoryDailyRepository, JsonFileDailyRepository};
pub use service::DailyChallengeService;
