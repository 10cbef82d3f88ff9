// Quiz engine core for a messaging bot.
// The transport (command parsing, reply rendering, delivery) lives outside
// this crate and talks to it through `QuizEngine::dispatch`.

pub mod achievements;
pub mod bank;
pub mod config;
pub mod daily;
pub mod engine;
pub mod locks;
pub mod quiz;
pub mod score;
pub mod selector;
pub mod storage;

// Re-export the types most callers need.
pub use achievements::{AchievementDef, AchievementEngine};
pub use bank::{BankError, Difficulty, Question, QuestionBank};
pub use config::EngineConfig;
pub use daily::{DailyChallenge, DailyChallengeService, DailyResult, DailyStats};
pub use engine::{EngineReply, QuizEngine, UserAction};
pub use quiz::{AnswerOutcome, AnswerResult, QuizError, QuizService, SessionStatus, SessionSummary};
pub use score::{Leaderboard, LeaderboardEntry, ScoreRecord, SortKey};
pub use selector::Selector;
pub use storage::StorageError;
