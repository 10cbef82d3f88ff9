use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Engine tuning knobs. Every field has a default, so a partial config
/// file deserializes cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Questions per regular quiz session.
    pub quiz_length: u32,
    /// How many recently asked question ids to remember per user.
    pub history_capacity: usize,
    /// Active sessions older than this are treated as stopped.
    pub session_timeout_secs: i64,
    /// Questions in the shared daily challenge set.
    pub daily_quiz_size: usize,
    /// Bonus points credited per correct daily-challenge answer.
    pub daily_bonus_per_correct: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quiz_length: 10,
            history_capacity: 50,
            session_timeout_secs: 3600,
            daily_quiz_size: 5,
            daily_bonus_per_correct: 2,
        }
    }
}

impl EngineConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::seconds(self.session_timeout_secs)
    }
}
