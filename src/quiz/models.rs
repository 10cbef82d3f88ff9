use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::{Difficulty, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Completed,
    Stopped,
}

/// One user's quiz attempt. At most one per user is `Active` at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub user_id: String,
    pub difficulty_filter: Option<Difficulty>,
    pub category_filter: Option<String>,
    pub current_question_id: String,
    pub questions_asked: u32,
    pub correct_count: u32,
    pub started_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl QuizSession {
    pub fn new(
        user_id: String,
        difficulty_filter: Option<Difficulty>,
        category_filter: Option<String>,
        first_question_id: String,
    ) -> Self {
        Self {
            user_id,
            difficulty_filter,
            category_filter,
            current_question_id: first_question_id,
            questions_asked: 0,
            correct_count: 0,
            started_at: Utc::now(),
            status: SessionStatus::Active,
        }
    }

    /// An abandoned session counts as stopped once the timeout elapses.
    pub fn is_expired(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && now - self.started_at > timeout
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            questions_asked: self.questions_asked,
            correct_count: self.correct_count,
            status: self.status,
        }
    }
}

/// Bounded FIFO of recently asked question ids, used to avoid immediate
/// repeats. Survives across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentHistory {
    capacity: usize,
    ids: VecDeque<String>,
}

impl RecentHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ids: VecDeque::with_capacity(capacity),
        }
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.ids.iter().any(|id| id == question_id)
    }

    /// Appends an id, evicting the oldest entry at capacity.
    pub fn push(&mut self, question_id: String) {
        if self.capacity == 0 {
            return;
        }
        while self.ids.len() >= self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(question_id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Where a session ended up, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub questions_asked: u32,
    pub correct_count: u32,
    pub status: SessionStatus,
}

impl SessionSummary {
    pub fn is_perfect(&self) -> bool {
        self.questions_asked > 0 && self.correct_count == self.questions_asked
    }
}

/// How a submitted answer was judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect { correct_choice_index: usize },
    /// The answer referenced a question that is no longer current
    /// (duplicate delivery); nothing was mutated.
    Stale,
}

/// Result of submitting an answer: judgement, plus either the next question
/// or the completion summary, and any achievements the answer unlocked.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    pub outcome: AnswerOutcome,
    pub next_question: Option<Question>,
    pub summary: Option<SessionSummary>,
    pub newly_unlocked: Vec<crate::achievements::AchievementDef>,
}

impl AnswerResult {
    pub fn stale() -> Self {
        Self {
            outcome: AnswerOutcome::Stale,
            next_question: None,
            summary: None,
            newly_unlocked: Vec::new(),
        }
    }
}

/// Read-only snapshot returned by the `status` verb.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub difficulty_filter: Option<Difficulty>,
    pub category_filter: Option<String>,
    pub current_question: Option<Question>,
    pub questions_asked: u32,
    pub correct_count: u32,
    pub started_at: DateTime<Utc>,
}
