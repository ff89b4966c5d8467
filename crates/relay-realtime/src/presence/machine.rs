//! Presence state machine.
//!
//! Raw status events and debounce firings are serialized through one task:
//! the machine owns its mailbox, its debounce controller and the
//! `online_since` marker, and is the only writer of the presence store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use relay_core::config::TrackerConfig;
use relay_core::error::AppError;
use relay_core::events::{AccountStatus, RawStatusEvent};
use relay_core::result::AppResult;
use relay_core::traits::{Clock, StatusEventStream};
use relay_core::types::AccountId;

use crate::metrics::RelayMetrics;
use crate::observer::hub::BroadcastHub;

use super::debounce::Debouncer;
use super::snapshot::format_last_seen;
use super::status::PresenceStatus;
use super::store::PresenceStore;

/// Work items processed by the machine, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MachineInput {
    /// A raw event from the account session.
    Status(RawStatusEvent),
    /// A debounce timer elapsed.
    ConfirmOffline { generation: u64 },
}

/// What a raw event means for the tracked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Online,
    Offline,
    Foreign,
}

/// Outcome of one select round in [`PresenceMachine::run`].
enum Step {
    Input(MachineInput),
    Cancelled,
    Disconnected,
}

/// Single-owner presence state machine for the tracked account.
#[derive(Debug)]
pub struct PresenceMachine {
    target: AccountId,
    store: PresenceStore,
    hub: Arc<BroadcastHub>,
    debounce: Debouncer,
    /// Start of the current online episode; cleared by any offline report.
    online_since: Option<DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    metrics: Arc<RelayMetrics>,
    mailbox_tx: mpsc::Sender<MachineInput>,
    mailbox_rx: mpsc::Receiver<MachineInput>,
}

impl PresenceMachine {
    /// Creates a machine tracking `target`.
    pub fn new(
        target: AccountId,
        store: PresenceStore,
        hub: Arc<BroadcastHub>,
        clock: Arc<dyn Clock>,
        metrics: Arc<RelayMetrics>,
        config: &TrackerConfig,
    ) -> Self {
        let (mailbox_tx, mailbox_rx) = mpsc::channel(config.mailbox_size.max(1));
        Self {
            target,
            store,
            hub,
            debounce: Debouncer::new(config.offline_delay()),
            online_since: None,
            clock,
            metrics,
            mailbox_tx,
            mailbox_rx,
        }
    }

    /// Whether an offline report is waiting for confirmation.
    pub fn is_offline_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Leaves `CONNECTING` using the status read at startup, then broadcasts
    /// unconditionally.
    pub async fn apply_initial(&mut self, status: AccountStatus) {
        match status {
            AccountStatus::Online => {
                self.online_since = Some(self.clock.now());
                self.store.update(|s| s.mark_online()).await;
            }
            AccountStatus::Offline { was_online } => {
                self.online_since = None;
                self.store.update(|s| s.mark_offline(was_online)).await;
            }
        }

        info!(
            account_id = %self.target,
            online = status.is_online(),
            "Initial presence synchronized"
        );
        self.publish().await;
    }

    /// Consumes `events` until cancellation or until the feed ends.
    ///
    /// The feed ending is fatal and reported as `AdapterDisconnected`. A
    /// pending debounce timer is abandoned either way.
    pub async fn run(
        mut self,
        mut events: StatusEventStream,
        cancel: CancellationToken,
    ) -> AppResult<()> {
        info!(account_id = %self.target, "Presence state machine running");

        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                Some(input) = self.mailbox_rx.recv() => Step::Input(input),
                event = events.next() => match event {
                    Some(event) => Step::Input(MachineInput::Status(event)),
                    None => Step::Disconnected,
                },
            };

            match step {
                Step::Input(input) => self.handle(input).await,
                Step::Cancelled => {
                    self.debounce.cancel();
                    info!("Presence state machine stopped");
                    return Ok(());
                }
                Step::Disconnected => {
                    self.debounce.cancel();
                    return Err(AppError::adapter_disconnected(
                        "Account session event stream ended",
                    ));
                }
            }
        }
    }

    pub(crate) async fn handle(&mut self, input: MachineInput) {
        match input {
            MachineInput::Status(event) => {
                self.metrics.event_received();
                match self.classify(&event) {
                    Signal::Online => self.on_online().await,
                    Signal::Offline => self.on_offline(),
                    Signal::Foreign => {
                        self.metrics.event_ignored();
                        debug!(account_id = %event.account_id, "Ignoring event for another account");
                    }
                }
            }
            MachineInput::ConfirmOffline { generation } => self.on_timer(generation).await,
        }
    }

    fn classify(&self, event: &RawStatusEvent) -> Signal {
        if event.account_id != self.target {
            return Signal::Foreign;
        }
        match event.status {
            AccountStatus::Online => Signal::Online,
            AccountStatus::Offline { .. } => Signal::Offline,
        }
    }

    async fn on_online(&mut self) {
        let cancelled = self.debounce.cancel();
        let already_online = self.store.read().await.status == PresenceStatus::Online;

        if already_online {
            if cancelled {
                self.metrics.flicker_suppressed();
                debug!("Pending offline cancelled by online report");
            }
            return;
        }

        self.online_since = Some(self.clock.now());
        self.store.update(|s| s.mark_online()).await;
        info!(account_id = %self.target, "Account is online");
        self.publish().await;
    }

    fn on_offline(&mut self) {
        self.online_since = None;

        let mailbox = self.mailbox_tx.clone();
        let generation = self.debounce.arm(move |generation| async move {
            if mailbox
                .send(MachineInput::ConfirmOffline { generation })
                .await
                .is_err()
            {
                warn!(generation, "Mailbox closed before offline confirmation");
            }
        });

        debug!(
            generation,
            delay_secs = self.debounce.delay().as_secs(),
            "Offline reported, waiting for confirmation"
        );
    }

    async fn on_timer(&mut self, generation: u64) {
        if !self.debounce.is_current(generation) {
            debug!(generation, "Ignoring superseded debounce firing");
            return;
        }
        self.debounce.settle(generation);

        if self.online_since.is_some() {
            debug!(generation, "Online episode in progress, offline not confirmed");
            return;
        }

        let now = self.clock.now();
        self.store.update(|s| s.mark_offline(Some(now))).await;
        self.metrics.offline_confirmed();
        info!(
            account_id = %self.target,
            last_seen = %format_last_seen(Some(&now)),
            "Account is offline"
        );
        self.publish().await;
    }

    async fn publish(&self) {
        let snapshot = self.store.read().await;
        self.hub.broadcast(&snapshot);
    }
}
