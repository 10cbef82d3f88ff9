use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::models::{AchievementContext, AchievementDef, AchievementRule};
use super::repository::AchievementRepository;
use super::rules::{
    CenturyClub, DailyChampion, FirstAnswer, PerfectScore, QuizMaster, Sharpshooter,
};
use crate::daily::DailyRepository;
use crate::quiz::SessionSummary;
use crate::score::ScoreRecord;
use crate::storage::StorageError;

/// Stateless rule evaluator, run after every score mutation. Grants are
/// at-most-once per `(user, badge)` and never retracted.
pub struct AchievementEngine {
    rules: Vec<Arc<dyn AchievementRule>>,
    unlocks: Arc<dyn AchievementRepository>,
    daily: Arc<dyn DailyRepository>,
}

impl AchievementEngine {
    pub fn builder(
        unlocks: Arc<dyn AchievementRepository>,
        daily: Arc<dyn DailyRepository>,
    ) -> AchievementEngineBuilder {
        AchievementEngineBuilder::new(unlocks, daily)
    }

    /// Evaluates every not-yet-granted rule against the freshly updated
    /// state and records new unlocks. Returns the newly granted badges.
    pub async fn evaluate(
        &self,
        user_id: &str,
        score: &ScoreRecord,
        session: Option<&SessionSummary>,
    ) -> Result<Vec<AchievementDef>, StorageError> {
        let already = self.unlocks.unlocked(user_id).await?;
        let daily_completions = self.daily.completions_for(user_id).await?.len() as u32;
        let ctx = AchievementContext {
            score,
            session,
            daily_completions,
        };

        let now = Utc::now();
        let mut newly_unlocked = Vec::new();
        for rule in &self.rules {
            let def = rule.def();
            if already.contains_key(def.id) {
                continue;
            }
            if !rule.satisfied(&ctx) {
                continue;
            }
            // insert returns false on a lost race; the badge was granted
            // elsewhere, so it is not "newly" unlocked here.
            if self.unlocks.insert(user_id, def.id, now).await? {
                info!(user_id, achievement = def.id, "Achievement unlocked");
                newly_unlocked.push(def.clone());
            }
        }

        Ok(newly_unlocked)
    }

    /// All grants for a user, with unlock timestamps, in rule order.
    pub async fn unlocked(
        &self,
        user_id: &str,
    ) -> Result<Vec<(AchievementDef, DateTime<Utc>)>, StorageError> {
        let unlocked = self.unlocks.unlocked(user_id).await?;
        Ok(self
            .rules
            .iter()
            .filter_map(|rule| {
                let def = rule.def();
                unlocked.get(def.id).map(|at| (def.clone(), *at))
            })
            .collect())
    }

    pub fn definitions(&self) -> Vec<AchievementDef> {
        self.rules.iter().map(|rule| rule.def().clone()).collect()
    }
}

pub struct AchievementEngineBuilder {
    rules: Vec<Arc<dyn AchievementRule>>,
    unlocks: Arc<dyn AchievementRepository>,
    daily: Arc<dyn DailyRepository>,
}

impl AchievementEngineBuilder {
    fn new(unlocks: Arc<dyn AchievementRepository>, daily: Arc<dyn DailyRepository>) -> Self {
        Self {
            rules: vec![
                Arc::new(FirstAnswer),
                Arc::new(Sharpshooter),
                Arc::new(QuizMaster),
                Arc::new(CenturyClub),
                Arc::new(PerfectScore),
                Arc::new(DailyChampion),
            ],
            unlocks,
            daily,
        }
    }

    pub fn with_rule(mut self, rule: Arc<dyn AchievementRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> AchievementEngine {
        AchievementEngine {
            rules: self.rules,
            unlocks: self.unlocks,
            daily: self.daily,
        }
    }
}
