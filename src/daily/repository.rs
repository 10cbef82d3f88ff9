use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::{DailyChallenge, DailyCompletion};
use crate::storage::{self, StorageError};

type CompletionMap = HashMap<String, BTreeMap<NaiveDate, DailyCompletion>>;

/// Challenge sets keyed by date plus completion records keyed by
/// `(user_id, date)`.
#[async_trait]
pub trait DailyRepository: Send + Sync {
    async fn get_challenge(&self, date: NaiveDate) -> Result<Option<DailyChallenge>, StorageError>;
    async fn put_challenge(&self, challenge: &DailyChallenge) -> Result<(), StorageError>;

    async fn get_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyCompletion>, StorageError>;

    /// Records a completion unless one exists; returns `false` (and writes
    /// nothing) for a duplicate `(user, date)` pair.
    async fn try_insert_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
        completion: &DailyCompletion,
    ) -> Result<bool, StorageError>;

    async fn completions_for(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<NaiveDate, DailyCompletion>, StorageError>;

    async fn all_completions(&self) -> Result<CompletionMap, StorageError>;
}

#[derive(Debug, Default)]
pub struct InMemoryDailyRepository {
    challenges: RwLock<HashMap<String, DailyChallenge>>,
    completions: RwLock<CompletionMap>,
}

impl InMemoryDailyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DailyRepository for InMemoryDailyRepository {
    async fn get_challenge(&self, date: NaiveDate) -> Result<Option<DailyChallenge>, StorageError> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(&date.to_string()).cloned())
    }

    async fn put_challenge(&self, challenge: &DailyChallenge) -> Result<(), StorageError> {
        let mut challenges = self.challenges.write().await;
        challenges.insert(challenge.date.to_string(), challenge.clone());
        Ok(())
    }

    async fn get_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyCompletion>, StorageError> {
        let completions = self.completions.read().await;
        Ok(completions
            .get(user_id)
            .and_then(|days| days.get(&date))
            .cloned())
    }

    async fn try_insert_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
        completion: &DailyCompletion,
    ) -> Result<bool, StorageError> {
        let mut completions = self.completions.write().await;
        let days = completions.entry(user_id.to_string()).or_default();
        if days.contains_key(&date) {
            return Ok(false);
        }
        days.insert(date, completion.clone());
        Ok(true)
    }

    async fn completions_for(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<NaiveDate, DailyCompletion>, StorageError> {
        let completions = self.completions.read().await;
        Ok(completions.get(user_id).cloned().unwrap_or_default())
    }

    async fn all_completions(&self) -> Result<CompletionMap, StorageError> {
        let completions = self.completions.read().await;
        Ok(completions.clone())
    }
}

/// Durable implementation: one JSON file for the per-date sets, one for the
/// completion records.
pub struct JsonFileDailyRepository {
    challenges_path: PathBuf,
    completions_path: PathBuf,
    challenges: RwLock<HashMap<String, DailyChallenge>>,
    completions: RwLock<CompletionMap>,
}

impl JsonFileDailyRepository {
    pub fn open(challenges_path: PathBuf, completions_path: PathBuf) -> Self {
        let challenges = storage::load_map(&challenges_path);
        let completions = storage::load_map(&completions_path);
        debug!(
            challenges = challenges.len(),
            users = completions.len(),
            "Opened daily challenge store"
        );
        Self {
            challenges_path,
            completions_path,
            challenges: RwLock::new(challenges),
            completions: RwLock::new(completions),
        }
    }
}

#[async_trait]
impl DailyRepository for JsonFileDailyRepository {
    async fn get_challenge(&self, date: NaiveDate) -> Result<Option<DailyChallenge>, StorageError> {
        let challenges = self.challenges.read().await;
        Ok(challenges.get(&date.to_string()).cloned())
    }

    async fn put_challenge(&self, challenge: &DailyChallenge) -> Result<(), StorageError> {
        let mut challenges = self.challenges.write().await;
        challenges.insert(challenge.date.to_string(), challenge.clone());
        storage::persist_map(&self.challenges_path, &challenges)
    }

    async fn get_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyCompletion>, StorageError> {
        let completions = self.completions.read().await;
        Ok(completions
            .get(user_id)
            .and_then(|days| days.get(&date))
            .cloned())
    }

    async fn try_insert_completion(
        &self,
        user_id: &str,
        date: NaiveDate,
        completion: &DailyCompletion,
    ) -> Result<bool, StorageError> {
        let mut completions = self.completions.write().await;
        let days = completions.entry(user_id.to_string()).or_default();
        if days.contains_key(&date) {
            return Ok(false);
        }
        days.insert(date, completion.clone());
        storage::persist_map(&self.completions_path, &completions)?;
        Ok(true)
    }

    async fn completions_for(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<NaiveDate, DailyCompletion>, StorageError> {
        let completions = self.completions.read().await;
        Ok(completions.get(user_id).cloned().unwrap_or_default())
    }

    async fn all_completions(&self) -> Result<CompletionMap, StorageError> {
        let completions = self.completions.read().await;
        Ok(completions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn completion(score: u32) -> DailyCompletion {
        DailyCompletion {
            score,
            total: 5,
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_completion_is_rejected_without_overwrite() {
        let repo = InMemoryDailyRepository::new();

        assert!(repo
            .try_insert_completion("u1", date(1), &completion(4))
            .await
            .unwrap());
        assert!(!repo
            .try_insert_completion("u1", date(1), &completion(1))
            .await
            .unwrap());

        let stored = repo.get_completion("u1", date(1)).await.unwrap().unwrap();
        assert_eq!(stored.score, 4, "first score must be kept");
    }

    #[tokio::test]
    async fn challenges_are_keyed_by_date() {
        let repo = InMemoryDailyRepository::new();
        let challenge = DailyChallenge {
            date: date(1),
            question_ids: vec!["q1".to_string(), "q2".to_string()],
        };
        repo.put_challenge(&challenge).await.unwrap();

        assert_eq!(repo.get_challenge(date(1)).await.unwrap(), Some(challenge));
        assert!(repo.get_challenge(date(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn json_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let challenges = dir.path().join("daily_challenges.json");
        let completions = dir.path().join("daily_completions.json");

        {
            let repo = JsonFileDailyRepository::open(challenges.clone(), completions.clone());
            repo.put_challenge(&DailyChallenge {
                date: date(1),
                question_ids: vec!["q1".to_string()],
            })
            .await
            .unwrap();
            repo.try_insert_completion("u1", date(1), &completion(3))
                .await
                .unwrap();
        }

        let reopened = JsonFileDailyRepository::open(challenges, completions);
        assert!(reopened.get_challenge(date(1)).await.unwrap().is_some());
        assert!(!reopened
            .try_insert_completion("u1", date(1), &completion(5))
            .await
            .unwrap());
    }
}
