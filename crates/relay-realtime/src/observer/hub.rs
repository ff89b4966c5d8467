//! Broadcast hub: registers observers and fans snapshots out to them.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use relay_core::config::RealtimeConfig;
use relay_core::error::AppError;

use crate::metrics::RelayMetrics;
use crate::presence::snapshot::PresenceSnapshot;
use crate::presence::store::PresenceStore;

use super::handle::{ObserverHandle, ObserverId, TransportSendError};
use super::pool::ObserverPool;

/// Registry of connected observers.
///
/// Every send happens while the presence store's read lock is held, so an
/// observer can never receive an older snapshot after a newer one.
#[derive(Debug)]
pub struct BroadcastHub {
    /// Connected observers.
    pool: ObserverPool,
    /// Source of the snapshot handed to new observers.
    store: PresenceStore,
    /// Metrics.
    metrics: Arc<RelayMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl BroadcastHub {
    /// Creates a hub reading from `store`.
    pub fn new(store: PresenceStore, metrics: Arc<RelayMetrics>, config: RealtimeConfig) -> Self {
        Self {
            pool: ObserverPool::new(),
            store,
            metrics,
            config,
        }
    }

    /// Registers a new observer and immediately queues the current snapshot
    /// for it.
    ///
    /// Returns the observer's ID and the receiver its connection task must
    /// drain. The queue closes when the observer is dropped from the hub.
    pub async fn register(
        &self,
        peer: Option<String>,
    ) -> Result<(ObserverId, mpsc::Receiver<String>), AppError> {
        if self.config.max_observers > 0 && self.pool.len() >= self.config.max_observers {
            warn!(
                max = self.config.max_observers,
                "Observer limit reached, refusing connection"
            );
            return Err(AppError::service_unavailable(format!(
                "Maximum number of observers ({}) reached",
                self.config.max_observers
            )));
        }

        let (handle, receiver) = ObserverHandle::new(peer, self.config.observer_buffer_size);
        let handle = Arc::new(handle);
        let id = handle.id;

        let snapshot = self.store.read().await;
        let payload = serde_json::to_string(&*snapshot)?;
        self.pool.add(handle.clone());
        if let Err(e) = handle.send(payload) {
            warn!(observer_id = %id, error = %e, "Failed to queue initial snapshot");
        }
        drop(snapshot);

        self.metrics.observer_connected();

        info!(
            observer_id = %id,
            peer = handle.peer.as_deref().unwrap_or("-"),
            observers = self.pool.len(),
            "Observer registered"
        );

        Ok((id, receiver))
    }

    /// Removes an observer on normal disconnect.
    pub fn unregister(&self, id: &ObserverId) {
        if self.pool.remove(id).is_some() {
            self.metrics.observer_disconnected();
            info!(observer_id = %id, observers = self.pool.len(), "Observer unregistered");
        }
    }

    /// Sends `snapshot` to every registered observer.
    ///
    /// An observer whose queue is closed or full is dropped from the hub.
    /// Failures never propagate; the return value is the number of
    /// observers the snapshot was queued for.
    pub fn broadcast(&self, snapshot: &PresenceSnapshot) -> usize {
        let payload = match serde_json::to_string(snapshot) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "Failed to serialize presence snapshot");
                return 0;
            }
        };

        let mut delivered = 0usize;
        for observer in self.pool.all() {
            match observer.send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => self.drop_observer(&observer, e),
            }
        }

        self.metrics.snapshot_broadcast(delivered as u64);
        debug!(
            status = %snapshot.status,
            delivered,
            "Presence snapshot broadcast"
        );
        delivered
    }

    fn drop_observer(&self, observer: &ObserverHandle, reason: TransportSendError) {
        if self.pool.remove(&observer.id).is_some() {
            self.metrics.observer_dropped();
            debug!(observer_id = %observer.id, reason = %reason, "Dropping unreachable observer");
        }
    }

    /// Disconnects every observer.
    pub fn close_all(&self) {
        let closed = self.pool.drain();
        for _ in &closed {
            self.metrics.observer_disconnected();
        }
        info!(count = closed.len(), "All observers closed");
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.pool.len()
    }

    /// Summaries of connected observers.
    pub fn observers(&self) -> Vec<super::handle::ObserverInfo> {
        self.pool.all().iter().map(|o| o.info()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::status::PresenceStatus;

    fn hub_with(config: RealtimeConfig) -> (BroadcastHub, PresenceStore) {
        let store = PresenceStore::new("Alice");
        let hub = BroadcastHub::new(store.clone(), Arc::new(RelayMetrics::new()), config);
        (hub, store)
    }

    fn decode(payload: &str) -> PresenceSnapshot {
        serde_json::from_str(payload).expect("snapshot json")
    }

    #[tokio::test]
    async fn test_register_sends_current_snapshot() {
        let (hub, store) = hub_with(RealtimeConfig::default());
        store.update(|s| s.mark_online()).await;

        let (_, mut rx) = hub.register(None).await.unwrap();
        let first = decode(&rx.try_recv().expect("initial snapshot"));
        assert_eq!(first.status, PresenceStatus::Online);
        assert_eq!(hub.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_observer() {
        let (hub, store) = hub_with(RealtimeConfig::default());
        let (_, mut a) = hub.register(None).await.unwrap();
        let (_, mut b) = hub.register(None).await.unwrap();
        a.try_recv().unwrap();
        b.try_recv().unwrap();

        store.update(|s| s.mark_offline(None)).await;
        let delivered = hub.broadcast(&store.snapshot().await);

        assert_eq!(delivered, 2);
        assert_eq!(decode(&a.try_recv().unwrap()).status, PresenceStatus::Offline);
        assert_eq!(decode(&b.try_recv().unwrap()).status, PresenceStatus::Offline);
    }

    #[tokio::test]
    async fn test_failed_observer_is_isolated_and_pruned() {
        let (hub, store) = hub_with(RealtimeConfig::default());
        let (_, dead) = hub.register(None).await.unwrap();
        let (_, mut alive) = hub.register(None).await.unwrap();
        alive.try_recv().unwrap();
        drop(dead);

        let delivered = hub.broadcast(&store.snapshot().await);

        assert_eq!(delivered, 1);
        assert!(alive.try_recv().is_ok());
        assert_eq!(hub.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_stalled_observer_is_pruned() {
        let config = RealtimeConfig {
            observer_buffer_size: 1,
            ..RealtimeConfig::default()
        };
        let (hub, store) = hub_with(config);
        let (_, _stalled) = hub.register(None).await.unwrap();

        // Buffer still holds the initial snapshot.
        assert_eq!(hub.broadcast(&store.snapshot().await), 0);
        assert_eq!(hub.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_unregister_closes_queue() {
        let (hub, _) = hub_with(RealtimeConfig::default());
        let (id, mut rx) = hub.register(None).await.unwrap();
        rx.recv().await.unwrap();

        hub.unregister(&id);
        assert_eq!(hub.observer_count(), 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_observer_limit() {
        let config = RealtimeConfig {
            max_observers: 1,
            ..RealtimeConfig::default()
        };
        let (hub, _) = hub_with(config);
        let _first = hub.register(None).await.unwrap();
        assert!(hub.register(None).await.is_err());
    }

    #[tokio::test]
    async fn test_close_all() {
        let (hub, _) = hub_with(RealtimeConfig::default());
        let (id, mut rx) = hub.register(Some("10.0.0.1:4000".into())).await.unwrap();
        rx.recv().await.unwrap();

        let listed = hub.observers();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].peer.as_deref(), Some("10.0.0.1:4000"));

        hub.close_all();
        assert_eq!(hub.observer_count(), 0);
        assert!(rx.recv().await.is_none());
    }
}
