//! In-memory store of tracked pull requests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::pull_request::{PullRequestId, TrackedPullRequest};

/// Keyed map from pull request id to its latest tracked state.
///
/// `get`, `put` and `remove` are individually exclusive. Callers that read,
/// talk to the chat thread and then write back hold [`SnapshotStore::lock`]
/// for the id across the whole sequence so notifications for the same pull
/// request never interleave.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: Mutex<HashMap<PullRequestId, TrackedPullRequest>>,
    id_locks: Mutex<HashMap<PullRequestId, Arc<AsyncMutex<()>>>>,
}

/// Exclusive access to one pull request id, released on drop.
#[derive(Debug)]
pub struct PullRequestGuard {
    id: PullRequestId,
    _guard: OwnedMutexGuard<()>,
}

impl PullRequestGuard {
    pub fn id(&self) -> PullRequestId {
        self.id
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PullRequestId) -> Option<TrackedPullRequest> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Inserts or replaces the entry keyed by `entry.id`.
    pub fn put(&self, entry: TrackedPullRequest) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.id, entry);
    }

    pub fn remove(&self, id: PullRequestId) -> Option<TrackedPullRequest> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn contains(&self, id: PullRequestId) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for exclusive access to `id`.
    pub async fn lock(&self, id: PullRequestId) -> PullRequestGuard {
        let id_lock = {
            let mut id_locks = self.id_locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Idle locks are only referenced by the map itself.
            id_locks.retain(|key, lock| *key == id || Arc::strong_count(lock) > 1);
            Arc::clone(id_locks.entry(id).or_default())
        };
        PullRequestGuard {
            id,
            _guard: id_lock.lock_owned().await,
        }
    }
}
