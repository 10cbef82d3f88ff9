use chrono::NaiveDate;
use thiserror::Error;

use crate::storage::StorageError;

/// Engine-level failures. State conflicts reject without mutating anything,
/// so callers can retry safely; stale answers are deliberately not an error.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("a quiz session is already active for this user")]
    SessionAlreadyActive,

    #[error("no active quiz session for this user")]
    NoActiveSession,

    #[error("no questions match the requested difficulty/category")]
    InvalidFilter,

    #[error("choice {index} is out of range for question {question_id}")]
    InvalidChoice { question_id: String, index: usize },

    #[error("daily challenge for {date} already completed")]
    AlreadyCompleted { date: NaiveDate },

    #[error("daily challenge expects {expected} answers, got {got}")]
    InvalidSubmission { expected: usize, got: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
