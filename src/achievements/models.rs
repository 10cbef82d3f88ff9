use serde::Serialize;

use crate::quiz::SessionSummary;
use crate::score::ScoreRecord;

/// Static description of a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// State snapshot a rule predicate is evaluated against, built fresh after
/// every scoring event.
pub struct AchievementContext<'a> {
    pub score: &'a ScoreRecord,
    /// Present when the event was a quiz completion.
    pub session: Option<&'a SessionSummary>,
    pub daily_completions: u32,
}

/// A rule is a badge plus its milestone predicate. Predicates must be
/// monotone over a user's history: once satisfied, the grant is permanent.
pub trait AchievementRule: Send + Sync {
    fn def(&self) -> &AchievementDef;
    fn satisfied(&self, ctx: &AchievementContext<'_>) -> bool;
}
