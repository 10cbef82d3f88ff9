pub mod engine;
pub mod models;
pub mod repository;
pub mod rules;

pub use engine::{AchievementEngine, AchievementEngineBuilder};
pub use models::{AchievementContext, AchievementDef, AchievementRule};
pub use repository::{
    AchievementRepository, InMemoryAchievementRepository, JsonFileAchievementRepository,
};
