use std::path::Path;
use std::sync::Arc;

use versequiz::{
    Difficulty, EngineConfig, EngineReply, Question, QuestionBank, QuizEngine, UserAction,
};

/// Installs a log subscriber honoring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A bank where choice 1 is always correct, split across two difficulties.
pub fn test_bank(count: usize) -> Arc<QuestionBank> {
    let questions = (0..count)
        .map(|i| Question {
            id: format!("q{i}"),
            prompt: format!("prompt {i}"),
            choices: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            correct_choice_index: 1,
            difficulty: if i % 2 == 0 {
                Difficulty::Easy
            } else {
                Difficulty::Hard
            },
            category: "old_testament".to_string(),
            book_reference: String::new(),
        })
        .collect();
    Arc::new(QuestionBank::from_questions(questions).unwrap())
}

pub fn file_backed_engine(data_dir: &Path) -> QuizEngine {
    QuizEngine::builder(test_bank(30))
        .with_config(EngineConfig::default())
        .with_data_dir(data_dir.to_path_buf())
        .build()
}

pub async fn start_quiz(engine: &QuizEngine, user: &str) -> Question {
    let reply = engine
        .dispatch(
            user,
            UserAction::Start {
                difficulty: None,
                category: None,
            },
        )
        .await
        .unwrap();
    match reply {
        EngineReply::QuestionIssued(question) => question,
        other => panic!("expected a question, got {other:?}"),
    }
}

/// Answers the current question, returning the next one while the session
/// stays active.
pub async fn answer_current(
    engine: &QuizEngine,
    user: &str,
    question: &Question,
    correct: bool,
) -> Option<Question> {
    let choice = if correct { 1 } else { 0 };
    let reply = engine
        .dispatch(
            user,
            UserAction::Answer {
                question_id: question.id.clone(),
                choice_index: choice,
            },
        )
        .await
        .unwrap();
    match reply {
        EngineReply::Answer(result) => result.next_question,
        other => panic!("expected an answer result, got {other:?}"),
    }
}
