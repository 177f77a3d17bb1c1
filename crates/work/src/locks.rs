//! Per-goal mutual exclusion for read-modify-write cycles.

use std::collections::HashMap;
use std::sync::Arc;

use habitual_core::GoalId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async lock per goal. Different goals never contend.
#[derive(Default)]
pub struct GoalLocks {
    locks: Mutex<HashMap<GoalId, Arc<Mutex<()>>>>,
}

impl GoalLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`; released when the guard drops.
    pub async fn lock(&self, id: GoalId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries only the table still references are idle.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of goals currently locked or awaited.
    pub async fn held(&self) -> usize {
        self.locks
            .lock()
            .await
            .values()
            .filter(|l| Arc::strong_count(l) > 1)
            .count()
    }
}
