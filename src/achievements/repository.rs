use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::storage::{self, StorageError};

/// Unlock records keyed `(user_id, achievement_id) -> unlock timestamp`.
/// Presence means granted; inserts of existing pairs are no-ops.
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    async fn unlocked(&self, user_id: &str)
        -> Result<HashMap<String, DateTime<Utc>>, StorageError>;

    /// Returns `false` when the pair already existed (nothing written).
    async fn insert(
        &self,
        user_id: &str,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;
}

type UnlockMap = HashMap<String, HashMap<String, DateTime<Utc>>>;

#[derive(Debug, Default)]
pub struct InMemoryAchievementRepository {
    unlocks: RwLock<UnlockMap>,
}

impl InMemoryAchievementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AchievementRepository for InMemoryAchievementRepository {
    async fn unlocked(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, DateTime<Utc>>, StorageError> {
        let unlocks = self.unlocks.read().await;
        Ok(unlocks.get(user_id).cloned().unwrap_or_default())
    }

    async fn insert(
        &self,
        user_id: &str,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut unlocks = self.unlocks.write().await;
        let user_unlocks = unlocks.entry(user_id.to_string()).or_default();
        if user_unlocks.contains_key(achievement_id) {
            return Ok(false);
        }
        user_unlocks.insert(achievement_id.to_string(), unlocked_at);
        Ok(true)
    }
}

/// JSON-file-backed unlock store.
pub struct JsonFileAchievementRepository {
    path: PathBuf,
    unlocks: RwLock<UnlockMap>,
}

impl JsonFileAchievementRepository {
    pub fn open(path: PathBuf) -> Self {
        let unlocks = storage::load_map(&path);
        debug!(path = %path.display(), users = unlocks.len(), "Opened achievement store");
        Self {
            path,
            unlocks: RwLock::new(unlocks),
        }
    }
}

#[async_trait]
impl AchievementRepository for JsonFileAchievementRepository {
    async fn unlocked(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, DateTime<Utc>>, StorageError> {
        let unlocks = self.unlocks.read().await;
        Ok(unlocks.get(user_id).cloned().unwrap_or_default())
    }

    async fn insert(
        &self,
        user_id: &str,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut unlocks = self.unlocks.write().await;
        let user_unlocks = unlocks.entry(user_id.to_string()).or_default();
        if user_unlocks.contains_key(achievement_id) {
            return Ok(false);
        }
        user_unlocks.insert(achievement_id.to_string(), unlocked_at);
        storage::persist_map(&self.path, &unlocks)?;
        Ok(true)
    }
}
