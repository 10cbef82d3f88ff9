use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use tracing::debug;

use crate::bank::{Difficulty, Question, QuestionBank};
use crate::quiz::RecentHistory;

/// Picks questions from the bank, avoiding recently asked ones.
#[derive(Clone)]
pub struct Selector {
    bank: Arc<QuestionBank>,
}

impl Selector {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    /// Random question matching the filters, excluding ids in `history`.
    ///
    /// When history exclusion would empty the pool, repeats are allowed
    /// rather than stalling the quiz. Returns `None` only when the filters
    /// themselves match nothing.
    pub fn next(
        &self,
        history: &RecentHistory,
        difficulty: Option<Difficulty>,
        category: Option<&str>,
    ) -> Option<Question> {
        let candidates = self.bank.filter(difficulty, category);
        if candidates.is_empty() {
            return None;
        }

        let fresh: Vec<&&Question> = candidates
            .iter()
            .filter(|q| !history.contains(&q.id))
            .collect();

        let mut rng = rand::rng();
        let picked = if fresh.is_empty() {
            debug!(
                pool = candidates.len(),
                "All candidates recently asked, allowing repeats"
            );
            candidates.choose(&mut rng).copied()
        } else {
            fresh.choose(&mut rng).map(|q| **q)
        };

        picked.cloned()
    }

    /// The fixed question-id set for a calendar date. Seeded by the date, so
    /// every user (and every process restart) derives the same set.
    pub fn daily_set(&self, date: NaiveDate, size: usize) -> Vec<String> {
        let mut ids: Vec<String> = self.bank.all().iter().map(|q| q.id.clone()).collect();
        let mut rng = StdRng::seed_from_u64(date.num_days_from_ce() as u64);
        ids.shuffle(&mut rng);
        ids.truncate(size);
        ids
    }
}
