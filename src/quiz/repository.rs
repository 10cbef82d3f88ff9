use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::models::{QuizSession, RecentHistory};
use crate::storage::{self, StorageError};

/// Per-user session state and recent-question history.
///
/// Both live in the same logical store: the history survives across sessions
/// while the session record is replaced on each new start.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn get_session(&self, user_id: &str) -> Result<Option<QuizSession>, StorageError>;
    async fn put_session(&self, session: &QuizSession) -> Result<(), StorageError>;
    async fn get_history(&self, user_id: &str) -> Result<Option<RecentHistory>, StorageError>;
    async fn put_history(&self, user_id: &str, history: &RecentHistory)
        -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSessionState {
    session: Option<QuizSession>,
    history: Option<RecentHistory>,
}

/// In-memory implementation for tests and development.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    users: RwLock<HashMap<String, UserSessionState>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn get_session(&self, user_id: &str) -> Result<Option<QuizSession>, StorageError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).and_then(|state| state.session.clone()))
    }

    async fn put_session(&self, session: &QuizSession) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        users.entry(session.user_id.clone()).or_default().session = Some(session.clone());
        Ok(())
    }

    async fn get_history(&self, user_id: &str) -> Result<Option<RecentHistory>, StorageError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).and_then(|state| state.history.clone()))
    }

    async fn put_history(
        &self,
        user_id: &str,
        history: &RecentHistory,
    ) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().history = Some(history.clone());
        Ok(())
    }
}

/// Durable implementation backed by a single JSON file.
pub struct JsonFileSessionRepository {
    path: PathBuf,
    users: RwLock<HashMap<String, UserSessionState>>,
}

impl JsonFileSessionRepository {
    pub fn open(path: PathBuf) -> Self {
        let users = storage::load_map(&path);
        debug!(path = %path.display(), users = users.len(), "Opened session store");
        Self {
            path,
            users: RwLock::new(users),
        }
    }

    async fn persist(
        &self,
        users: &HashMap<String, UserSessionState>,
    ) -> Result<(), StorageError> {
        storage::persist_map(&self.path, users)
    }
}

#[async_trait]
impl SessionRepository for JsonFileSessionRepository {
    async fn get_session(&self, user_id: &str) -> Result<Option<QuizSession>, StorageError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).and_then(|state| state.session.clone()))
    }

    async fn put_session(&self, session: &QuizSession) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        users.entry(session.user_id.clone()).or_default().session = Some(session.clone());
        self.persist(&users).await
    }

    async fn get_history(&self, user_id: &str) -> Result<Option<RecentHistory>, StorageError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).and_then(|state| state.history.clone()))
    }

    async fn put_history(
        &self,
        user_id: &str,
        history: &RecentHistory,
    ) -> Result<(), StorageError> {
        let mut users = self.users.write().await;
        users.entry(user_id.to_string()).or_default().history = Some(history.clone());
        self.persist(&users).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(user_id: &str) -> QuizSession {
        QuizSession::new(user_id.to_string(), None, None, "q1".to_string())
    }

    #[tokio::test]
    async fn in_memory_stores_sessions_and_history_independently() {
        let repo = InMemorySessionRepository::new();
        assert!(repo.get_session("u1").await.unwrap().is_none());

        repo.put_session(&session("u1")).await.unwrap();
        assert!(repo.get_session("u1").await.unwrap().is_some());
        assert!(repo.get_history("u1").await.unwrap().is_none());

        let mut history = RecentHistory::new(5);
        history.push("q1".to_string());
        repo.put_history("u1", &history).await.unwrap();

        let loaded = repo.get_history("u1").await.unwrap().unwrap();
        assert!(loaded.contains("q1"));
        // Session untouched by the history write.
        assert!(repo.get_session("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn json_file_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");

        {
            let repo = JsonFileSessionRepository::open(path.clone());
            repo.put_session(&session("u1")).await.unwrap();
            let mut history = RecentHistory::new(5);
            history.push("q1".to_string());
            repo.put_history("u1", &history).await.unwrap();
        }

        let reopened = JsonFileSessionRepository::open(path);
        let loaded = reopened.get_session("u1").await.unwrap().unwrap();
        assert_eq!(loaded.current_question_id, "q1");
        assert!(reopened.get_history("u1").await.unwrap().unwrap().contains("q1"));
    }
}
