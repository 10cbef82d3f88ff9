use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementDef;

/// The shared question set for one calendar date. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub date: NaiveDate,
    pub question_ids: Vec<String>,
}

/// One user's completion of one date's challenge. At most one per
/// `(user, date)`; a second attempt is rejected, not re-scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCompletion {
    pub score: u32,
    pub total: u32,
    pub completed_at: DateTime<Utc>,
}

impl DailyCompletion {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.score) / f64::from(self.total) * 100.0
        }
    }
}

/// Outcome of a scored daily submission.
#[derive(Debug, Clone)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub score: u32,
    pub total: u32,
    pub bonus_points: u32,
    pub newly_unlocked: Vec<AchievementDef>,
}

/// Per-user daily-challenge aggregates, derived on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub total_completed: u32,
    pub total_correct: u32,
    pub total_answered: u32,
    pub best_accuracy: f64,
    /// Consecutive completed days ending at the reference date.
    pub current_streak: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLeaderboardEntry {
    pub user_id: String,
    pub total_completed: u32,
    pub total_correct: u32,
    pub avg_accuracy: f64,
}
