//! Observer pool tracking all connected observers.

use std::sync::Arc;

use dashmap::DashMap;

use super::handle::{ObserverHandle, ObserverId};

/// Thread-safe set of connected observers, keyed by observer ID.
///
/// Connects and disconnects mutate it from connection tasks while the
/// presence worker iterates it; the map's own sharded locking is enough.
#[derive(Debug, Default)]
pub struct ObserverPool {
    by_id: DashMap<ObserverId, Arc<ObserverHandle>>,
}

impl ObserverPool {
    /// Creates a new empty pool.
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
        }
    }

    /// Adds an observer.
    pub fn add(&self, handle: Arc<ObserverHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes an observer.
    pub fn remove(&self, id: &ObserverId) -> Option<Arc<ObserverHandle>> {
        self.by_id.remove(id).map(|(_, handle)| handle)
    }

    /// Returns all observer handles.
    pub fn all(&self) -> Vec<Arc<ObserverHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns the number of connected observers.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no observer is connected.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Removes every observer, returning them.
    pub fn drain(&self) -> Vec<Arc<ObserverHandle>> {
        let ids: Vec<ObserverId> = self.by_id.iter().map(|entry| *entry.key()).collect();
        ids.iter().filter_map(|id| self.remove(id)).collect()
    }
}
