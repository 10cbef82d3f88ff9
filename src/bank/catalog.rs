use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use super::models::{BankStats, Difficulty, Question};

/// Catalog validation failures are configuration errors: the process should
/// refuse to start rather than serve a broken question set.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("question catalog is empty")]
    EmptyCatalog,

    #[error("duplicate question id: {0}")]
    DuplicateId(String),

    #[error("question {id} has {count} choices, need at least 2")]
    TooFewChoices { id: String, count: usize },

    #[error("question {id} marks choice {index} correct but only has {choices} choices")]
    CorrectIndexOutOfRange {
        id: String,
        index: usize,
        choices: usize,
    },

    #[error("failed to parse question catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read question catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only question catalog, loaded once at startup.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    by_id: HashMap<String, usize>,
}

impl QuestionBank {
    /// Validates and indexes a set of questions.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::EmptyCatalog);
        }

        let mut by_id = HashMap::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            if question.choices.len() < 2 {
                return Err(BankError::TooFewChoices {
                    id: question.id.clone(),
                    count: question.choices.len(),
                });
            }
            if question.correct_choice_index >= question.choices.len() {
                return Err(BankError::CorrectIndexOutOfRange {
                    id: question.id.clone(),
                    index: question.correct_choice_index,
                    choices: question.choices.len(),
                });
            }
            if by_id.insert(question.id.clone(), index).is_some() {
                return Err(BankError::DuplicateId(question.id.clone()));
            }
        }

        info!(questions = questions.len(), "Loaded question catalog");
        Ok(Self { questions, by_id })
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::from_questions(questions)
    }

    pub fn from_file(path: &Path) -> Result<Self, BankError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json(include_str!("../../assets/questions.json"))
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.by_id.get(id).map(|&index| &self.questions[index])
    }

    /// Questions matching both optional filters.
    pub fn filter(&self, difficulty: Option<Difficulty>, category: Option<&str>) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| difficulty.is_none_or(|d| q.difficulty == d))
            .filter(|q| category.is_none_or(|c| q.category == c))
            .collect()
    }

    pub fn stats(&self) -> BankStats {
        let mut by_difficulty = HashMap::new();
        let mut by_category = HashMap::new();
        for question in &self.questions {
            *by_difficulty.entry(question.difficulty).or_insert(0) += 1;
            *by_category.entry(question.category.clone()).or_insert(0) += 1;
        }
        BankStats {
            total: self.questions.len(),
            by_difficulty,
            by_category,
        }
    }
}
