/**
 * Per-container mutation locks
 *
 * Every insert, move and delete holds the lock of each container it touches
 * for its whole read-plan-apply sequence. Locks are taken in ascending id
 * order so two cross-container moves in opposite directions cannot
 * deadlock.
 */
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of one async mutex per container id
#[derive(Clone, Default)]
pub struct ContainerLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

/// Held locks; released on drop
pub struct ContainerGuard {
    containers: Vec<Uuid>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl ContainerGuard {
    /// Containers held, in acquisition order
    pub fn containers(&self) -> &[Uuid] {
        &self.containers
    }
}

impl ContainerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, container_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(container_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Lock every container in `containers`, deduplicated, in ascending order
    pub async fn acquire(&self, containers: &[Uuid]) -> ContainerGuard {
        let mut ordered = containers.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for container_id in &ordered {
            guards.push(self.lock_for(*container_id).lock_owned().await);
        }
        ContainerGuard {
            containers: ordered,
            _guards: guards,
        }
    }

    /// Drop registry entries nobody is holding or waiting on
    pub fn prune(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
