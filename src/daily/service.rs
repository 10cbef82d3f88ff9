use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument};

use super::models::{
    DailyChallenge, DailyCompletion, DailyLeaderboardEntry, DailyResult, DailyStats,
};
use super::repository::DailyRepository;
use crate::achievements::AchievementEngine;
use crate::bank::{Question, QuestionBank};
use crate::config::EngineConfig;
use crate::locks::UserLocks;
use crate::quiz::QuizError;
use crate::score::ScoreRepository;
use crate::selector::Selector;

/// Assigns one fixed question set per calendar day, shared by all users,
/// and scores each user's single attempt. Date rollover is observed lazily
/// on access; no timer lives here.
pub struct DailyChallengeService {
    bank: Arc<QuestionBank>,
    selector: Selector,
    repository: Arc<dyn DailyRepository>,
    scores: Arc<dyn ScoreRepository>,
    achievements: Arc<AchievementEngine>,
    locks: Arc<UserLocks>,
    config: EngineConfig,
}

impl DailyChallengeService {
    pub fn new(
        bank: Arc<QuestionBank>,
        repository: Arc<dyn DailyRepository>,
        scores: Arc<dyn ScoreRepository>,
        achievements: Arc<AchievementEngine>,
        locks: Arc<UserLocks>,
        config: EngineConfig,
    ) -> Self {
        Self {
            selector: Selector::new(bank.clone()),
            bank,
            repository,
            scores,
            achievements,
            locks,
            config,
        }
    }

    /// The challenge for `date`, creating it on first access. The derivation
    /// is seeded by the date, so a concurrent create writes the same set and
    /// the set is stable across restarts.
    #[instrument(skip(self))]
    pub async fn challenge_for(&self, date: NaiveDate) -> Result<DailyChallenge, QuizError> {
        if let Some(existing) = self.repository.get_challenge(date).await? {
            return Ok(existing);
        }

        let question_ids = self.selector.daily_set(date, self.config.daily_quiz_size);
        if question_ids.is_empty() {
            return Err(QuizError::InvalidFilter);
        }

        let challenge = DailyChallenge { date, question_ids };
        self.repository.put_challenge(&challenge).await?;
        info!(%date, questions = challenge.question_ids.len(), "Created daily challenge");
        Ok(challenge)
    }

    /// The challenge's questions in set order.
    pub async fn questions_for(&self, date: NaiveDate) -> Result<Vec<Question>, QuizError> {
        let challenge = self.challenge_for(date).await?;
        Ok(challenge
            .question_ids
            .iter()
            .filter_map(|id| self.bank.get(id).cloned())
            .collect())
    }

    /// Scores one attempt. Exactly one attempt per `(user, date)` succeeds;
    /// later ones get `AlreadyCompleted` with nothing re-scored. The bonus
    /// goes to `daily_bonus_points` only, never to the regular quiz totals.
    #[instrument(skip(self, answers))]
    pub async fn submit(
        &self,
        user_id: &str,
        date: NaiveDate,
        answers: &[usize],
    ) -> Result<DailyResult, QuizError> {
        let challenge = self.challenge_for(date).await?;
        if answers.len() != challenge.question_ids.len() {
            return Err(QuizError::InvalidSubmission {
                expected: challenge.question_ids.len(),
                got: answers.len(),
            });
        }

        // Validate all indices before mutating anything.
        let mut correct = 0u32;
        for (question_id, &choice) in challenge.question_ids.iter().zip(answers) {
            let Some(question) = self.bank.get(question_id) else {
                debug!(question_id, "Challenge references unknown question, counting incorrect");
                continue;
            };
            if choice >= question.choices.len() {
                return Err(QuizError::InvalidChoice {
                    question_id: question_id.clone(),
                    index: choice,
                });
            }
            if question.is_correct(choice) {
                correct += 1;
            }
        }

        let _guard = self.locks.acquire(user_id).await;

        let total = challenge.question_ids.len() as u32;
        let completion = DailyCompletion {
            score: correct,
            total,
            completed_at: Utc::now(),
        };
        if !self
            .repository
            .try_insert_completion(user_id, date, &completion)
            .await?
        {
            return Err(QuizError::AlreadyCompleted { date });
        }

        let bonus_points = correct * self.config.daily_bonus_per_correct;
        let mut record = self.scores.get(user_id).await?.unwrap_or_default();
        record.daily_bonus_points += bonus_points;
        self.scores.put(user_id, &record).await?;

        let newly_unlocked = self.achievements.evaluate(user_id, &record, None).await?;

        info!(user_id, %date, correct, total, "Daily challenge completed");
        Ok(DailyResult {
            date,
            score: correct,
            total,
            bonus_points,
            newly_unlocked,
        })
    }

    /// Today's challenge (UTC).
    pub async fn todays_challenge(&self) -> Result<DailyChallenge, QuizError> {
        self.challenge_for(Utc::now().date_naive()).await
    }

    /// Scores an attempt against today's challenge (UTC).
    pub async fn submit_today(
        &self,
        user_id: &str,
        answers: &[usize],
    ) -> Result<DailyResult, QuizError> {
        self.submit(user_id, Utc::now().date_naive(), answers).await
    }

    pub async fn has_completed(&self, user_id: &str, date: NaiveDate) -> Result<bool, QuizError> {
        Ok(self.repository.get_completion(user_id, date).await?.is_some())
    }

    /// Aggregates a user's completions; the streak counts consecutive days
    /// ending at `today`.
    pub async fn stats(&self, user_id: &str, today: NaiveDate) -> Result<DailyStats, QuizError> {
        let completions = self.repository.completions_for(user_id).await?;

        let mut stats = DailyStats::default();
        for completion in completions.values() {
            stats.total_completed += 1;
            stats.total_correct += completion.score;
            stats.total_answered += completion.total;
            if completion.accuracy() > stats.best_accuracy {
                stats.best_accuracy = completion.accuracy();
            }
        }

        let mut day = today;
        while completions.contains_key(&day) {
            stats.current_streak += 1;
            day = day - Duration::days(1);
        }

        Ok(stats)
    }

    /// Daily-challenge ranking: most completions first, average accuracy as
    /// the tie-break, then user id for determinism.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<DailyLeaderboardEntry>, QuizError> {
        let all = self.repository.all_completions().await?;

        let mut entries: Vec<DailyLeaderboardEntry> = all
            .into_iter()
            .map(|(user_id, days)| {
                let total_completed = days.len() as u32;
                let total_correct: u32 = days.values().map(|c| c.score).sum();
                let total_answered: u32 = days.values().map(|c| c.total).sum();
                let avg_accuracy = if total_answered == 0 {
                    0.0
                } else {
                    f64::from(total_correct) / f64::from(total_answered) * 100.0
                };
                DailyLeaderboardEntry {
                    user_id,
                    total_completed,
                    total_correct,
                    avg_accuracy,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.total_completed
                .cmp(&a.total_completed)
                .then_with(|| {
                    b.avg_accuracy
                        .partial_cmp(&a.avg_accuracy)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::InMemoryAchievementRepository;
    use crate::bank::Difficulty;
    use crate::daily::InMemoryDailyRepository;
    use crate::score::InMemoryScoreRepository;

    fn bank() -> Arc<QuestionBank> {
        let questions = (0..10)
            .map(|i| Question {
                id: format!("q{i}"),
                prompt: format!("prompt {i}"),
                choices: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                correct_choice_index: 1,
                difficulty: Difficulty::Easy,
                category: "old_testament".to_string(),
                book_reference: String::new(),
            })
            .collect();
        Arc::new(QuestionBank::from_questions(questions).unwrap())
    }

    struct Setup {
        service: DailyChallengeService,
        scores: Arc<InMemoryScoreRepository>,
        daily: Arc<InMemoryDailyRepository>,
    }

    fn setup() -> Setup {
        let bank = bank();
        let daily = Arc::new(InMemoryDailyRepository::new());
        let scores = Arc::new(InMemoryScoreRepository::new());
        let achievements = Arc::new(
            AchievementEngine::builder(
                Arc::new(InMemoryAchievementRepository::new()),
                daily.clone(),
            )
            .build(),
        );
        let service = DailyChallengeService::new(
            bank,
            daily.clone(),
            scores.clone(),
            achievements,
            Arc::new(UserLocks::new()),
            EngineConfig::default(),
        );
        Setup {
            service,
            scores,
            daily,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    /// All questions in the test bank share correct index 1.
    fn answers(challenge: &DailyChallenge, correct: usize) -> Vec<usize> {
        (0..challenge.question_ids.len())
            .map(|i| if i < correct { 1 } else { 0 })
            .collect()
    }

    #[tokio::test]
    async fn challenge_is_created_once_and_stable() {
        let setup = setup();
        let first = setup.service.challenge_for(date()).await.unwrap();
        let second = setup.service.challenge_for(date()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.question_ids.len(), 5);
    }

    #[tokio::test]
    async fn submit_scores_and_credits_bonus_separately() {
        let setup = setup();
        let challenge = setup.service.challenge_for(date()).await.unwrap();

        let result = setup
            .service
            .submit("u1", date(), &answers(&challenge, 4))
            .await
            .unwrap();

        assert_eq!(result.score, 4);
        assert_eq!(result.total, 5);
        assert_eq!(result.bonus_points, 8);

        let record = setup.scores.get("u1").await.unwrap().unwrap();
        assert_eq!(record.daily_bonus_points, 8);
        // Regular quiz aggregates stay untouched.
        assert_eq!(record.total_answered, 0);
        assert_eq!(record.total_correct, 0);
    }

    #[tokio::test]
    async fn second_submission_same_day_is_rejected_unchanged() {
        let setup = setup();
        let challenge = setup.service.challenge_for(date()).await.unwrap();

        let first = setup
            .service
            .submit("u1", date(), &answers(&challenge, 5))
            .await
            .unwrap();
        assert_eq!(first.score, 5);

        let second = setup
            .service
            .submit("u1", date(), &answers(&challenge, 1))
            .await;
        assert!(matches!(second, Err(QuizError::AlreadyCompleted { .. })));

        let stored = setup.daily.get_completion("u1", date()).await.unwrap().unwrap();
        assert_eq!(stored.score, 5, "first attempt's score must be kept");
        let record = setup.scores.get("u1").await.unwrap().unwrap();
        assert_eq!(record.daily_bonus_points, 10, "bonus must not be re-credited");
    }

    #[tokio::test]
    async fn wrong_answer_count_is_a_validation_error() {
        let setup = setup();
        let result = setup.service.submit("u1", date(), &[1, 1]).await;
        assert!(matches!(
            result,
            Err(QuizError::InvalidSubmission { expected: 5, got: 2 })
        ));
        assert!(!setup.service.has_completed("u1", date()).await.unwrap());
    }

    #[tokio::test]
    async fn out_of_range_choice_is_rejected_before_recording() {
        let setup = setup();
        let result = setup.service.submit("u1", date(), &[1, 1, 9, 1, 1]).await;
        assert!(matches!(result, Err(QuizError::InvalidChoice { index: 9, .. })));
        assert!(!setup.service.has_completed("u1", date()).await.unwrap());
    }

    #[tokio::test]
    async fn stats_tracks_streak_of_consecutive_days() {
        let setup = setup();
        let today = date();

        for days_ago in [0i64, 1, 2, 4] {
            let day = today - Duration::days(days_ago);
            let challenge = setup.service.challenge_for(day).await.unwrap();
            setup
                .service
                .submit("u1", day, &answers(&challenge, 3))
                .await
                .unwrap();
        }

        let stats = setup.service.stats("u1", today).await.unwrap();
        assert_eq!(stats.total_completed, 4);
        assert_eq!(stats.current_streak, 3, "gap at day 3 breaks the streak");
        assert_eq!(stats.total_correct, 12);
        assert_eq!(stats.total_answered, 20);
    }

    #[tokio::test]
    async fn leaderboard_ranks_by_completions_then_accuracy() {
        let setup = setup();
        let today = date();

        for (user, days, correct) in [("busy", 3, 2), ("sharp", 2, 5), ("steady", 2, 3)] {
            for offset in 0..days {
                let day = today - Duration::days(offset);
                let challenge = setup.service.challenge_for(day).await.unwrap();
                setup
                    .service
                    .submit(user, day, &answers(&challenge, correct))
                    .await
                    .unwrap();
            }
        }

        let board = setup.service.leaderboard(10).await.unwrap();
        let order: Vec<&str> = board.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["busy", "sharp", "steady"]);
    }
}
