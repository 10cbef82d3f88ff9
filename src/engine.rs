use std::path::PathBuf;
use std::sync::Arc;

use crate::achievements::{
    AchievementEngine, InMemoryAchievementRepository, JsonFileAchievementRepository,
};
use crate::bank::{Difficulty, Question, QuestionBank};
use crate::config::EngineConfig;
use crate::daily::{
    DailyChallengeService, InMemoryDailyRepository, JsonFileDailyRepository,
};
use crate::locks::UserLocks;
use crate::quiz::{
    AnswerResult, InMemorySessionRepository, JsonFileSessionRepository, QuizError, QuizService,
    SessionSummary, SessionView,
};
use crate::score::{
    InMemoryScoreRepository, JsonFileScoreRepository, Leaderboard, ScoreRecord,
};

/// Verbs the messaging layer forwards into the core. The payloads are
/// already parsed; this crate never touches message text.
#[derive(Debug, Clone)]
pub enum UserAction {
    Start {
        difficulty: Option<Difficulty>,
        category: Option<String>,
    },
    Answer {
        question_id: String,
        choice_index: usize,
    },
    Stop,
    Status,
}

/// Structured results for the caller to render. No formatting here.
#[derive(Debug, Clone)]
pub enum EngineReply {
    QuestionIssued(Question),
    Answer(AnswerResult),
    Stopped(SessionSummary),
    Status {
        session: Option<SessionView>,
        score: ScoreRecord,
    },
}

/// Front door for the quiz core: owns the services and the shared per-user
/// lock map, and routes verbs to them.
pub struct QuizEngine {
    quiz: QuizService,
    daily: DailyChallengeService,
    leaderboard: Leaderboard,
    achievements: Arc<AchievementEngine>,
}

impl QuizEngine {
    pub fn builder(bank: Arc<QuestionBank>) -> QuizEngineBuilder {
        QuizEngineBuilder::new(bank)
    }

    pub async fn dispatch(
        &self,
        user_id: &str,
        action: UserAction,
    ) -> Result<EngineReply, QuizError> {
        match action {
            UserAction::Start {
                difficulty,
                category,
            } => {
                let question = self.quiz.start(user_id, difficulty, category).await?;
                Ok(EngineReply::QuestionIssued(question))
            }
            UserAction::Answer {
                question_id,
                choice_index,
            } => {
                let result = self
                    .quiz
                    .submit_answer(user_id, &question_id, choice_index)
                    .await?;
                Ok(EngineReply::Answer(result))
            }
            UserAction::Stop => {
                let summary = self.quiz.stop(user_id).await?;
                Ok(EngineReply::Stopped(summary))
            }
            UserAction::Status => {
                let session = self.quiz.status(user_id).await?;
                let score = self.quiz.score(user_id).await?;
                Ok(EngineReply::Status { session, score })
            }
        }
    }

    pub fn quiz(&self) -> &QuizService {
        &self.quiz
    }

    pub fn daily(&self) -> &DailyChallengeService {
        &self.daily
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }
}

/// Wires repositories to services. Storage is in-memory unless a data
/// directory is configured, in which case every store becomes a JSON file
/// under it; the services never branch on storage kind.
pub struct QuizEngineBuilder {
    bank: Arc<QuestionBank>,
    config: EngineConfig,
    data_dir: Option<PathBuf>,
}

impl QuizEngineBuilder {
    fn new(bank: Arc<QuestionBank>) -> Self {
        Self {
            bank,
            config: EngineConfig::default(),
            data_dir: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = Some(data_dir);
        self
    }

    pub fn build(self) -> QuizEngine {
        let (sessions, scores, daily_repo, unlocks): (
            Arc<dyn crate::quiz::SessionRepository>,
            Arc<dyn crate::score::ScoreRepository>,
            Arc<dyn crate::daily::DailyRepository>,
            Arc<dyn crate::achievements::AchievementRepository>,
        ) = match &self.data_dir {
            Some(dir) => (
                Arc::new(JsonFileSessionRepository::open(dir.join("sessions.json"))),
                Arc::new(JsonFileScoreRepository::open(dir.join("scores.json"))),
                Arc::new(JsonFileDailyRepository::open(
                    dir.join("daily_challenges.json"),
                    dir.join("daily_completions.json"),
                )),
                Arc::new(JsonFileAchievementRepository::open(
                    dir.join("achievements.json"),
                )),
            ),
            None => (
                Arc::new(InMemorySessionRepository::new()),
                Arc::new(InMemoryScoreRepository::new()),
                Arc::new(InMemoryDailyRepository::new()),
                Arc::new(InMemoryAchievementRepository::new()),
            ),
        };

        let locks = Arc::new(UserLocks::new());
        let achievements = Arc::new(AchievementEngine::builder(unlocks, daily_repo.clone()).build());

        QuizEngine {
            quiz: QuizService::new(
                self.bank.clone(),
                sessions,
                scores.clone(),
                achievements.clone(),
                locks.clone(),
                self.config.clone(),
            ),
            daily: DailyChallengeService::new(
                self.bank,
                daily_repo,
                scores.clone(),
                achievements.clone(),
                locks,
                self.config,
            ),
            leaderboard: Leaderboard::new(scores),
            achievements,
        }
    }
}
