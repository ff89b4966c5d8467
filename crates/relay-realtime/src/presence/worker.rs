//! Tracker worker: brings the presence state machine up and runs it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use relay_core::config::{TargetConfig, TrackerConfig};
use relay_core::result::AppResult;
use relay_core::traits::{AccountSession, Clock};
use relay_core::types::Identity;

use crate::metrics::RelayMetrics;
use crate::observer::hub::BroadcastHub;

use super::machine::PresenceMachine;
use super::store::PresenceStore;

/// Lifecycle of the tracker worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    /// Not started yet.
    Idle,
    /// Resolving the target and reading its initial status.
    Starting,
    /// Consuming status events.
    Running,
    /// Stopped by shutdown.
    Stopped,
    /// Failed fatally (resolution failure or lost feed).
    Failed,
}

impl TrackerState {
    /// Returns the state as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Owns the startup sequence: resolve the target (with the one import
/// fallback), subscribe to the feed, apply the initial status, then hand
/// over to the state machine until cancellation or a fatal error.
#[derive(Debug)]
pub struct TrackerWorker {
    session: Arc<dyn AccountSession>,
    target: TargetConfig,
    tracker: TrackerConfig,
    store: PresenceStore,
    hub: Arc<BroadcastHub>,
    clock: Arc<dyn Clock>,
    metrics: Arc<RelayMetrics>,
    state: Arc<watch::Sender<TrackerState>>,
}

impl TrackerWorker {
    /// Creates a worker. Nothing happens until [`TrackerWorker::run`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: Arc<dyn AccountSession>,
        target: TargetConfig,
        tracker: TrackerConfig,
        store: PresenceStore,
        hub: Arc<BroadcastHub>,
        clock: Arc<dyn Clock>,
        metrics: Arc<RelayMetrics>,
        state: Arc<watch::Sender<TrackerState>>,
    ) -> Self {
        Self {
            session,
            target,
            tracker,
            store,
            hub,
            clock,
            metrics,
            state,
        }
    }

    /// Runs until `cancel` fires (`Ok`) or the worker fails fatally (`Err`).
    pub async fn run(self, cancel: CancellationToken) -> AppResult<()> {
        self.state.send_replace(TrackerState::Starting);

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Ok(()),
            result = self.start_and_track(cancel.clone()) => result,
        };

        match &outcome {
            Ok(()) => {
                self.state.send_replace(TrackerState::Stopped);
                info!("Tracker worker stopped");
            }
            Err(e) => {
                self.state.send_replace(TrackerState::Failed);
                error!(error = %e, kind = %e.kind, "Tracker worker failed");
            }
        }
        outcome
    }

    async fn start_and_track(&self, cancel: CancellationToken) -> AppResult<()> {
        let identity = self.resolve_target().await?;
        info!(
            account_id = %identity.id,
            name = %self.target.name,
            "Tracking account"
        );

        // Subscribe first so that no transition between the status read and
        // the subscription is lost.
        let events = self.session.status_events().await?;
        let status = self.session.current_status(&identity).await?;

        let mut machine = PresenceMachine::new(
            identity.id,
            self.store.clone(),
            self.hub.clone(),
            self.clock.clone(),
            self.metrics.clone(),
            &self.tracker,
        );
        machine.apply_initial(status).await;

        self.state.send_replace(TrackerState::Running);
        machine.run(events, cancel).await
    }

    /// Direct lookup, falling back once to importing the identifier as a
    /// contact under the configured name.
    async fn resolve_target(&self) -> AppResult<Identity> {
        let identifier = self.target.identifier.as_str();
        match self.session.resolve_identity(identifier).await {
            Ok(identity) => Ok(identity),
            Err(e) if e.is_resolution() => {
                warn!(
                    identifier,
                    error = %e,
                    "Direct lookup failed, importing as contact"
                );
                self.session
                    .import_and_resolve(identifier, &self.target.name)
                    .await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use relay_core::config::RealtimeConfig;
    use relay_core::error::ErrorKind;
    use relay_core::events::{AccountStatus, RawStatusEvent};
    use relay_core::traits::SystemClock;
    use relay_gateway::MemorySession;

    use super::*;
    use crate::presence::status::PresenceStatus;

    struct Fixture {
        store: PresenceStore,
        state: watch::Receiver<TrackerState>,
        worker: TrackerWorker,
    }

    fn fixture(session: Arc<MemorySession>, identifier: &str) -> Fixture {
        let store = PresenceStore::new("Alice");
        let metrics = Arc::new(RelayMetrics::new());
        let hub = Arc::new(BroadcastHub::new(
            store.clone(),
            metrics.clone(),
            RealtimeConfig::default(),
        ));
        let (state_tx, state) = watch::channel(TrackerState::Idle);
        let worker = TrackerWorker::new(
            session,
            TargetConfig {
                identifier: identifier.to_string(),
                name: "Alice".to_string(),
            },
            TrackerConfig::default(),
            store.clone(),
            hub,
            Arc::new(SystemClock),
            metrics,
            Arc::new(state_tx),
        );
        Fixture {
            store,
            state,
            worker,
        }
    }

    #[tokio::test]
    async fn test_direct_resolution_and_initial_status() {
        let session = Arc::new(MemorySession::new().with_contact(
            "@alice",
            Identity::new(42),
            AccountStatus::Online,
        ));
        let f = fixture(session.clone(), "@alice");
        let cancel = CancellationToken::new();
        let task = tokio::spawn(f.worker.run(cancel.clone()));

        let mut state = f.state.clone();
        state
            .wait_for(|s| *s == TrackerState::Running)
            .await
            .unwrap();
        assert_eq!(f.store.snapshot().await.status, PresenceStatus::Online);
        assert_eq!(session.import_count(), 0);

        cancel.cancel();
        assert!(task.await.unwrap().is_ok());
        assert_eq!(*f.state.borrow(), TrackerState::Stopped);
    }

    #[tokio::test]
    async fn test_import_fallback_on_resolution_failure() {
        let session = Arc::new(MemorySession::new().with_importable(
            "+15550100",
            Identity::new(7),
            AccountStatus::offline_unknown(),
        ));
        let f = fixture(session.clone(), "+15550100");
        let cancel = CancellationToken::new();
        let _task = tokio::spawn(f.worker.run(cancel.clone()));

        let mut state = f.state.clone();
        state
            .wait_for(|s| *s == TrackerState::Running)
            .await
            .unwrap();
        assert_eq!(session.import_count(), 1);
        let snapshot = f.store.snapshot().await;
        assert_eq!(snapshot.status, PresenceStatus::Offline);
        assert_eq!(snapshot.last_seen_label(), "--");
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_unresolvable_target_is_fatal() {
        let session = Arc::new(MemorySession::new());
        let f = fixture(session.clone(), "@ghost");

        let err = f.worker.run(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
        assert_eq!(session.import_count(), 1);
        assert_eq!(*f.state.borrow(), TrackerState::Failed);
        assert_eq!(f.store.snapshot().await.status, PresenceStatus::Connecting);
    }

    #[tokio::test]
    async fn test_lost_feed_is_fatal() {
        let session = Arc::new(MemorySession::new().with_contact(
            "@alice",
            Identity::new(42),
            AccountStatus::offline_unknown(),
        ));
        let f = fixture(session.clone(), "@alice");
        let task = tokio::spawn(f.worker.run(CancellationToken::new()));

        let mut state = f.state.clone();
        state
            .wait_for(|s| *s == TrackerState::Running)
            .await
            .unwrap();
        session.push(RawStatusEvent::online(42));
        session.disconnect();

        let err = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("worker finished")
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AdapterDisconnected);
        assert_eq!(f.store.snapshot().await.status, PresenceStatus::Online);
    }
}
