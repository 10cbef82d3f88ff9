use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};

/// Per-user mutex map. Operations for different users run concurrently;
/// operations for the same user are serialized by holding the returned guard.
#[derive(Debug, Default)]
pub struct UserLocks {
    inner: RwLock<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let guard = self.inner.read().await;
            guard.get(user_id).cloned()
        };

        let lock = match lock {
            Some(lock) => lock,
            None => {
                let mut guard = self.inner.write().await;
                guard
                    .entry(user_id.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                    .clone()
            }
        };

        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn serializes_same_user_operations() {
        let locks = Arc::new(UserLocks::new());
        let counter = Arc::new(AtomicU32::new(0));
        let peak = Arc::new(AtomicU32::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let locks = locks.clone();
                let counter = counter.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    let _guard = locks.acquire("u1").await;
                    let inside = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(inside, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    counter.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1, "critical section overlapped");
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let locks = UserLocks::new();
        let _a = locks.acquire("u1").await;
        // Must not deadlock while u1's guard is held.
        let _b = locks.acquire("u2").await;
    }
}
