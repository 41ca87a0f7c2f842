use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::llm::PlanGenerator;

/// One async mutex per user id. Schedule mutations for a user run under its guard.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let user_lock = {
            let mut locks = self.inner.lock().await;
            // Only the map holds an idle lock; held or awaited locks have more references.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        user_lock.lock_owned().await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub planner: Arc<dyn PlanGenerator>,
    pub locks: UserLocks,
}

impl AppState {
    pub fn new(db: SqlitePool, planner: Arc<dyn PlanGenerator>) -> Self {
        Self {
            db,
            planner,
            locks: UserLocks::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_user_is_serialized() {
        let locks = UserLocks::new();
        let guard = locks.lock("u1").await;

        let contender = locks.clone();
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), contender.lock("u1")).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired =
            tokio::time::timeout(Duration::from_millis(50), locks.lock("u1")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn idle_locks_are_evicted() {
        let locks = UserLocks::new();
        for i in 0..1000 {
            let guard = locks.lock(&format!("user-{}", i)).await;
            drop(guard);
        }

        let held = locks.lock("kept").await;
        let _other = locks.lock("other").await;

        let registry = locks.inner.lock().await;
        assert!(registry.len() <= 2);
        assert!(registry.contains_key("kept"));
        drop(registry);
        drop(held);
    }

    #[tokio::test]
    async fn different_users_do_not_block() {
        let locks = UserLocks::new();
        let _guard = locks.lock("u1").await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock("u2")).await;
        assert!(other.is_ok());
    }
}
