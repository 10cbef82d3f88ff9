pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::QuizError;
pub use models::{
    AnswerOutcome, AnswerResult, QuizSession, RecentHistory, SessionStatus, SessionSummary,
    SessionView,
};
pub use repository::{InMemorySessionRepository, JsonFileSessionRepository, SessionRepository};
pub use service::QuizService;
