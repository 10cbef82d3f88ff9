use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use super::errors::QuizError;
use super::models::{
    AnswerOutcome, AnswerResult, QuizSession, RecentHistory, SessionStatus, SessionSummary,
    SessionView,
};
use super::repository::SessionRepository;
use crate::achievements::AchievementEngine;
use crate::bank::{Difficulty, Question, QuestionBank};
use crate::config::EngineConfig;
use crate::locks::UserLocks;
use crate::score::{ScoreRecord, ScoreRepository};
use crate::selector::Selector;

/// Per-user quiz state machine: `NoSession -> Active -> {Completed, Stopped}`.
/// Terminal records are replaced by the next `start`. Same-user operations
/// are serialized through the shared lock map.
pub struct QuizService {
    bank: Arc<QuestionBank>,
    selector: Selector,
    sessions: Arc<dyn SessionRepository>,
    scores: Arc<dyn ScoreRepository>,
    achievements: Arc<AchievementEngine>,
    locks: Arc<UserLocks>,
    config: EngineConfig,
}

impl QuizService {
    pub fn new(
        bank: Arc<QuestionBank>,
        sessions: Arc<dyn SessionRepository>,
        scores: Arc<dyn ScoreRepository>,
        achievements: Arc<AchievementEngine>,
        locks: Arc<UserLocks>,
        config: EngineConfig,
    ) -> Self {
        Self {
            selector: Selector::new(bank.clone()),
            bank,
            sessions,
            scores,
            achievements,
            locks,
            config,
        }
    }

    /// Starts a quiz and issues its first question.
    #[instrument(skip(self))]
    pub async fn start(
        &self,
        user_id: &str,
        difficulty: Option<Difficulty>,
        category: Option<String>,
    ) -> Result<Question, QuizError> {
        let _guard = self.locks.acquire(user_id).await;

        if self.live_session(user_id).await?.is_some() {
            return Err(QuizError::SessionAlreadyActive);
        }

        let mut history = self.history(user_id).await?;
        let question = self
            .selector
            .next(&history, difficulty, category.as_deref())
            .ok_or(QuizError::InvalidFilter)?;

        history.push(question.id.clone());
        self.sessions.put_history(user_id, &history).await?;

        let session = QuizSession::new(
            user_id.to_string(),
            difficulty,
            category,
            question.id.clone(),
        );
        self.sessions.put_session(&session).await?;

        info!(user_id, question_id = %question.id, "Quiz session started");
        Ok(question)
    }

    /// Judges an answer to the current question.
    ///
    /// A `question_id` that is not the current one is treated as a duplicate
    /// delivery and ignored without touching any state.
    #[instrument(skip(self))]
    pub async fn submit_answer(
        &self,
        user_id: &str,
        question_id: &str,
        choice_index: usize,
    ) -> Result<AnswerResult, QuizError> {
        let _guard = self.locks.acquire(user_id).await;

        let mut session = self
            .live_session(user_id)
            .await?
            .ok_or(QuizError::NoActiveSession)?;

        if session.current_question_id != question_id {
            debug!(
                user_id,
                submitted = question_id,
                current = %session.current_question_id,
                "Ignoring stale answer"
            );
            return Ok(AnswerResult::stale());
        }

        let Some(question) = self.bank.get(question_id).cloned() else {
            // The catalog rotated under a persisted session. Re-issue a
            // fresh question instead of wedging the quiz.
            return self.reissue_question(session).await;
        };

        if choice_index >= question.choices.len() {
            return Err(QuizError::InvalidChoice {
                question_id: question_id.to_string(),
                index: choice_index,
            });
        }

        let correct = question.is_correct(choice_index);
        session.questions_asked += 1;
        if correct {
            session.correct_count += 1;
        }

        let mut record = self.score(user_id).await?;
        record.record_answer(correct, Utc::now());

        let completed = session.questions_asked >= self.config.quiz_length;
        if completed {
            session.status = SessionStatus::Completed;
            record.record_quiz_completed(session.correct_count, session.questions_asked);
        }
        self.scores.put(user_id, &record).await?;

        let summary = completed.then(|| session.summary());
        let newly_unlocked = self
            .achievements
            .evaluate(user_id, &record, summary.as_ref())
            .await?;

        let next_question = if completed {
            None
        } else {
            match self.next_question(&mut session).await? {
                Some(next) => Some(next),
                None => {
                    // Selection pool vanished mid-session; end it cleanly.
                    session.status = SessionStatus::Completed;
                    None
                }
            }
        };

        self.sessions.put_session(&session).await?;

        if completed {
            info!(
                user_id,
                correct = session.correct_count,
                total = session.questions_asked,
                "Quiz session completed"
            );
        }

        Ok(AnswerResult {
            outcome: if correct {
                AnswerOutcome::Correct
            } else {
                AnswerOutcome::Incorrect {
                    correct_choice_index: question.correct_choice_index,
                }
            },
            next_question,
            summary: (session.status != SessionStatus::Active).then(|| session.summary()),
            newly_unlocked,
        })
    }

    /// Stops an active session; no further scoring happens.
    #[instrument(skip(self))]
    pub async fn stop(&self, user_id: &str) -> Result<SessionSummary, QuizError> {
        let _guard = self.locks.acquire(user_id).await;

        let mut session = self
            .live_session(user_id)
            .await?
            .ok_or(QuizError::NoActiveSession)?;

        session.status = SessionStatus::Stopped;
        self.sessions.put_session(&session).await?;

        info!(user_id, answered = session.questions_asked, "Quiz session stopped");
        Ok(session.summary())
    }

    /// Read-only view of the user's active session, if any.
    pub async fn status(&self, user_id: &str) -> Result<Option<SessionView>, QuizError> {
        let Some(session) = self.live_session(user_id).await? else {
            return Ok(None);
        };
        Ok(Some(SessionView {
            difficulty_filter: session.difficulty_filter,
            category_filter: session.category_filter.clone(),
            current_question: self.bank.get(&session.current_question_id).cloned(),
            questions_asked: session.questions_asked,
            correct_count: session.correct_count,
            started_at: session.started_at,
        }))
    }

    /// The user's cumulative score, defaulting to an empty record.
    pub async fn score(&self, user_id: &str) -> Result<ScoreRecord, QuizError> {
        Ok(self.scores.get(user_id).await?.unwrap_or_default())
    }

    /// The active session for `user_id`, reaping it first if it idled past
    /// the timeout so abandoned quizzes never lock a user out.
    async fn live_session(&self, user_id: &str) -> Result<Option<QuizSession>, QuizError> {
        let Some(mut session) = self.sessions.get_session(user_id).await? else {
            return Ok(None);
        };
        if session.status != SessionStatus::Active {
            return Ok(None);
        }
        if session.is_expired(self.config.session_timeout(), Utc::now()) {
            debug!(user_id, "Reaping idle session");
            session.status = SessionStatus::Stopped;
            self.sessions.put_session(&session).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn history(&self, user_id: &str) -> Result<RecentHistory, QuizError> {
        Ok(self
            .sessions
            .get_history(user_id)
            .await?
            .unwrap_or_else(|| RecentHistory::new(self.config.history_capacity)))
    }

    async fn next_question(
        &self,
        session: &mut QuizSession,
    ) -> Result<Option<Question>, QuizError> {
        let mut history = self.history(&session.user_id).await?;
        let Some(question) = self.selector.next(
            &history,
            session.difficulty_filter,
            session.category_filter.as_deref(),
        ) else {
            return Ok(None);
        };

        history.push(question.id.clone());
        self.sessions.put_history(&session.user_id, &history).await?;
        session.current_question_id = question.id.clone();
        Ok(Some(question))
    }

    async fn reissue_question(
        &self,
        mut session: QuizSession,
    ) -> Result<AnswerResult, QuizError> {
        let next_question = self.next_question(&mut session).await?;
        if next_question.is_none() {
            session.status = SessionStatus::Stopped;
        }
        self.sessions.put_session(&session).await?;
        Ok(AnswerResult {
            outcome: AnswerOutcome::Stale,
            next_question,
            summary: None,
            newly_unlocked: Vec::new(),
        })
    }
}
