use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::ScoreRecord;
use crate::storage::{self, StorageError};

/// Durable key-value mapping `user_id -> ScoreRecord`. All mutations are
/// single-user read-modify-write; the engine holds the per-user lock.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<ScoreRecord>, StorageError>;
    async fn put(&self, user_id: &str, record: &ScoreRecord) -> Result<(), StorageError>;
    async fn all(&self) -> Result<Vec<(String, ScoreRecord)>, StorageError>;
}

#[derive(Debug, Default)]
pub struct InMemoryScoreRepository {
    records: RwLock<HashMap<String, ScoreRecord>>,
}

impl InMemoryScoreRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreRepository for InMemoryScoreRepository {
    async fn get(&self, user_id: &str) -> Result<Option<ScoreRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: &ScoreRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        records.insert(user_id.to_string(), record.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<(String, ScoreRecord)>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(user_id, record)| (user_id.clone(), record.clone()))
            .collect())
    }
}

/// JSON-file-backed score store.
pub struct JsonFileScoreRepository {
    path: PathBuf,
    records: RwLock<HashMap<String, ScoreRecord>>,
}

impl JsonFileScoreRepository {
    pub fn open(path: PathBuf) -> Self {
        let records = storage::load_map(&path);
        debug!(path = %path.display(), users = records.len(), "Opened score store");
        Self {
            path,
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ScoreRepository for JsonFileScoreRepository {
    async fn get(&self, user_id: &str) -> Result<Option<ScoreRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: &ScoreRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        records.insert(user_id.to_string(), record.clone());
        storage::persist_map(&self.path, &records)
    }

    async fn all(&self) -> Result<Vec<(String, ScoreRecord)>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(user_id, record)| (user_id.clone(), record.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn get_is_none_until_first_put() {
        let repo = InMemoryScoreRepository::new();
        assert!(repo.get("u1").await.unwrap().is_none());

        let mut record = ScoreRecord::default();
        record.record_answer(true, Utc::now());
        repo.put("u1", &record).await.unwrap();

        assert_eq!(repo.get("u1").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn json_file_scores_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");

        {
            let repo = JsonFileScoreRepository::open(path.clone());
            let mut record = ScoreRecord::default();
            record.record_answer(true, Utc::now());
            record.record_answer(false, Utc::now());
            repo.put("u1", &record).await.unwrap();
        }

        let reopened = JsonFileScoreRepository::open(path);
        let loaded = reopened.get("u1").await.unwrap().unwrap();
        assert_eq!(loaded.total_answered, 2);
        assert_eq!(loaded.total_correct, 1);
    }
}
