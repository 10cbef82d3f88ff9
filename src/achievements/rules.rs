//! The built-in badge set.

use super::models::{AchievementContext, AchievementDef, AchievementRule};

pub struct FirstAnswer;

static FIRST_ANSWER: AchievementDef = AchievementDef {
    id: "first_answer",
    name: "First Steps",
    description: "Answer your first quiz question",
};

impl AchievementRule for FirstAnswer {
    fn def(&self) -> &AchievementDef {
        &FIRST_ANSWER
    }

    fn satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        ctx.score.total_answered >= 1
    }
}

pub struct Sharpshooter;

static SHARPSHOOTER: AchievementDef = AchievementDef {
    id: "sharpshooter",
    name: "Sharpshooter",
    description: "Answer 10 questions correctly in a row",
};

impl AchievementRule for Sharpshooter {
    fn def(&self) -> &AchievementDef {
        &SHARPSHOOTER
    }

    fn satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        ctx.score.best_streak >= 10
    }
}

pub struct QuizMaster;

static QUIZ_MASTER: AchievementDef = AchievementDef {
    id: "quiz_master",
    name: "Quiz Master",
    description: "Answer 100 quiz questions correctly",
};

impl AchievementRule for QuizMaster {
    fn def(&self) -> &AchievementDef {
        &QUIZ_MASTER
    }

    fn satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        ctx.score.total_correct >= 100
    }
}

pub struct CenturyClub;

static CENTURY_CLUB: AchievementDef = AchievementDef {
    id: "century_club",
    name: "Century Club",
    description: "Answer 100 quiz questions",
};

impl AchievementRule for CenturyClub {
    fn def(&self) -> &AchievementDef {
        &CENTURY_CLUB
    }

    fn satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        ctx.score.total_answered >= 100
    }
}

pub struct PerfectScore;

static PERFECT_SCORE: AchievementDef = AchievementDef {
    id: "perfect_score",
    name: "Perfect Score",
    description: "Finish a quiz with every answer correct",
};

impl AchievementRule for PerfectScore {
    fn def(&self) -> &AchievementDef {
        &PERFECT_SCORE
    }

    fn satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        ctx.session.is_some_and(|s| s.is_perfect())
    }
}

pub struct DailyChampion;

static DAILY_CHAMPION: AchievementDef = AchievementDef {
    id: "daily_champion",
    name: "Daily Champion",
    description: "Complete 10 daily challenges",
};

impl AchievementRule for DailyChampion {
    fn def(&self) -> &AchievementDef {
        &DAILY_CHAMPION
    }

    fn satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        ctx.daily_completions >= 10
    }
}
