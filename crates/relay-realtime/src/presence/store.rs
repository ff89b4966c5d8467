//! Presence store, the single source of truth for the current snapshot.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use super::snapshot::PresenceSnapshot;

/// Shared handle to the one presence snapshot of the process.
///
/// Readers (the broadcast hub, HTTP handlers) take the read lock; only the
/// presence state machine writes.
#[derive(Debug, Clone)]
pub struct PresenceStore {
    inner: Arc<RwLock<PresenceSnapshot>>,
}

impl PresenceStore {
    /// Create a store in the `CONNECTING` state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(PresenceSnapshot::connecting(name))),
        }
    }

    /// Copy of the current snapshot.
    pub async fn snapshot(&self) -> PresenceSnapshot {
        self.inner.read().await.clone()
    }

    /// Hold the snapshot for reading. No write can happen while the guard
    /// is alive, so anything sent under it is the current value.
    pub async fn read(&self) -> RwLockReadGuard<'_, PresenceSnapshot> {
        self.inner.read().await
    }

    /// Apply an in-place update.
    pub(crate) async fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut PresenceSnapshot),
    {
        let mut snapshot = self.inner.write().await;
        apply(&mut snapshot);
    }
}
