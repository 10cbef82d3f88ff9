use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::models::ScoreRecord;
use super::repository::ScoreRepository;
use crate::quiz::QuizError;

/// Which aggregate to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    TotalCorrect,
    TotalAnswered,
    BestStreak,
}

impl SortKey {
    fn value(&self, record: &ScoreRecord) -> u32 {
        match self {
            Self::TotalCorrect => record.total_correct,
            Self::TotalAnswered => record.total_answered,
            Self::BestStreak => record.best_streak,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub record: ScoreRecord,
}

/// Read-only ranked projection over the score store. Never persisted,
/// recomputed on every read.
pub struct Leaderboard {
    scores: Arc<dyn ScoreRepository>,
}

impl Leaderboard {
    pub fn new(scores: Arc<dyn ScoreRepository>) -> Self {
        Self { scores }
    }

    /// Top `n` users, descending by `key`. Ties go to the earlier
    /// `last_played_at` (longevity wins), then to the smaller `user_id`
    /// for determinism; users who never played sort last within a tie.
    #[instrument(skip(self))]
    pub async fn top(&self, n: usize, key: SortKey) -> Result<Vec<LeaderboardEntry>, QuizError> {
        let mut rows = self.scores.all().await?;
        rows.sort_by(|(a_id, a), (b_id, b)| {
            key.value(b)
                .cmp(&key.value(a))
                .then_with(|| compare_last_played(a.last_played_at, b.last_played_at))
                .then_with(|| a_id.cmp(b_id))
        });

        Ok(rows
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(index, (user_id, record))| LeaderboardEntry {
                rank: index + 1,
                user_id,
                record,
            })
            .collect())
    }
}

fn compare_last_played(
    a: Option<chrono::DateTime<chrono::Utc>>,
    b: Option<chrono::DateTime<chrono::Utc>>,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
