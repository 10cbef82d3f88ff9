use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable per-user aggregate. Created lazily on first play, never deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRecord {
    pub total_answered: u32,
    pub total_correct: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub quizzes_completed: u32,
    /// Best single-quiz accuracy so far, in percent.
    pub best_accuracy: f64,
    /// Daily-challenge bonus, kept apart from regular scoring so
    /// quiz-specific achievement thresholds are not double-counted.
    pub daily_bonus_points: u32,
    pub last_played_at: Option<DateTime<Utc>>,
}

impl ScoreRecord {
    /// Applies one judged answer: totals, streaks, and play timestamp.
    pub fn record_answer(&mut self, correct: bool, now: DateTime<Utc>) {
        self.total_answered += 1;
        if correct {
            self.total_correct += 1;
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }
        self.last_played_at = Some(now);
    }

    /// Applies a finished quiz: completion count and best accuracy.
    pub fn record_quiz_completed(&mut self, correct: u32, total: u32) {
        self.quizzes_completed += 1;
        if total > 0 {
            let accuracy = f64::from(correct) / f64::from(total) * 100.0;
            if accuracy > self.best_accuracy {
                self.best_accuracy = accuracy;
            }
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_answered == 0 {
            0.0
        } else {
            f64::from(self.total_correct) / f64::from(self.total_answered) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_grows_on_correct_and_resets_on_incorrect() {
        let mut record = ScoreRecord::default();
        let now = Utc::now();

        record.record_answer(true, now);
        record.record_answer(true, now);
        assert_eq!(record.current_streak, 2);
        assert_eq!(record.best_streak, 2);

        record.record_answer(false, now);
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.best_streak, 2);

        record.record_answer(true, now);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.best_streak, 2);

        assert_eq!(record.total_answered, 4);
        assert_eq!(record.total_correct, 3);
        assert_eq!(record.last_played_at, Some(now));
    }

    #[test]
    fn best_accuracy_only_improves() {
        let mut record = ScoreRecord::default();
        record.record_quiz_completed(7, 10);
        assert!((record.best_accuracy - 70.0).abs() < f64::EPSILON);

        record.record_quiz_completed(5, 10);
        assert!((record.best_accuracy - 70.0).abs() < f64::EPSILON);

        record.record_quiz_completed(10, 10);
        assert!((record.best_accuracy - 100.0).abs() < f64::EPSILON);
        assert_eq!(record.quizzes_completed, 3);
    }
}
