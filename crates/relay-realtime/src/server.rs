//! Top-level relay engine that ties the presence subsystems together.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use relay_core::config::AppConfig;
use relay_core::result::AppResult;
use relay_core::traits::{AccountSession, Clock, SystemClock};

use crate::metrics::RelayMetrics;
use crate::observer::hub::BroadcastHub;
use crate::presence::snapshot::PresenceSnapshot;
use crate::presence::store::PresenceStore;
use crate::presence::worker::{TrackerState, TrackerWorker};

/// Central engine shared by the HTTP layer and the tracker worker.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// The single presence snapshot.
    pub store: PresenceStore,
    /// Observer registry.
    pub hub: Arc<BroadcastHub>,
    /// Metrics collector.
    pub metrics: Arc<RelayMetrics>,
    clock: Arc<dyn Clock>,
    config: Arc<AppConfig>,
    state: Arc<watch::Sender<TrackerState>>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("observers", &self.hub.observer_count())
            .field("tracker", &*self.state.borrow())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates an engine using the system clock.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an engine with an explicit clock.
    pub fn with_clock(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        let metrics = Arc::new(RelayMetrics::new());
        let store = PresenceStore::new(config.target.name.clone());
        let hub = Arc::new(BroadcastHub::new(
            store.clone(),
            metrics.clone(),
            config.realtime.clone(),
        ));
        let (state, _) = watch::channel(TrackerState::Idle);

        info!(target_name = %config.target.name, "Relay engine initialized");

        Self {
            store,
            hub,
            metrics,
            clock,
            config,
            state: Arc::new(state),
            shutdown: CancellationToken::new(),
        }
    }

    /// Spawns the tracker worker on `session`. The handle resolves to the
    /// worker's outcome; an `Err` is fatal to the process.
    pub fn spawn_tracker(&self, session: Arc<dyn AccountSession>) -> JoinHandle<AppResult<()>> {
        let worker = TrackerWorker::new(
            session,
            self.config.target.clone(),
            self.config.tracker.clone(),
            self.store.clone(),
            self.hub.clone(),
            self.clock.clone(),
            self.metrics.clone(),
            self.state.clone(),
        );
        tokio::spawn(worker.run(self.shutdown.child_token()))
    }

    /// Current tracker lifecycle state.
    pub fn tracker_state(&self) -> TrackerState {
        *self.state.borrow()
    }

    /// Subscribe to tracker lifecycle changes.
    pub fn tracker_state_receiver(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    /// Copy of the current presence snapshot.
    pub async fn snapshot(&self) -> PresenceSnapshot {
        self.store.snapshot().await
    }

    /// Stops the tracker worker and disconnects every observer.
    pub fn shutdown(&self) {
        info!("Shutting down relay engine");
        self.shutdown.cancel();
        self.hub.close_all();
        info!("Relay engine shut down");
    }
}
