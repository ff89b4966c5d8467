//! Relay engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Observers ever registered
    pub observers_total: AtomicU64,
    /// Observers currently registered
    pub observers_active: AtomicU64,
    /// Observers removed after a failed send
    pub observers_dropped: AtomicU64,
    /// Snapshot broadcasts performed
    pub snapshots_broadcast: AtomicU64,
    /// Individual snapshot deliveries queued
    pub deliveries: AtomicU64,
    /// Raw status events received from the session
    pub events_received: AtomicU64,
    /// Raw events concerning other accounts
    pub events_ignored: AtomicU64,
    /// Offline reports cancelled by an online event before confirmation
    pub flickers_suppressed: AtomicU64,
    /// Offline transitions confirmed by the debounce timer
    pub offline_confirmed: AtomicU64,
}

impl RelayMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn observer_connected(&self) {
        self.observers_total.fetch_add(1, Ordering::Relaxed);
        self.observers_active.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn observer_disconnected(&self) {
        let _ = self
            .observers_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub(crate) fn observer_dropped(&self) {
        self.observers_dropped.fetch_add(1, Ordering::Relaxed);
        self.observer_disconnected();
    }

    pub(crate) fn snapshot_broadcast(&self, delivered: u64) {
        self.snapshots_broadcast.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered, Ordering::Relaxed);
    }

    pub(crate) fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn event_ignored(&self) {
        self.events_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn flicker_suppressed(&self) {
        self.flickers_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn offline_confirmed(&self) {
        self.offline_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            observers_total: self.observers_total.load(Ordering::Relaxed),
            observers_active: self.observers_active.load(Ordering::Relaxed),
            observers_dropped: self.observers_dropped.load(Ordering::Relaxed),
            snapshots_broadcast: self.snapshots_broadcast.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_ignored: self.events_ignored.load(Ordering::Relaxed),
            flickers_suppressed: self.flickers_suppressed.load(Ordering::Relaxed),
            offline_confirmed: self.offline_confirmed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Observers ever registered
    pub observers_total: u64,
    /// Observers currently registered
    pub observers_active: u64,
    /// Observers removed after a failed send
    pub observers_dropped: u64,
    /// Snapshot broadcasts performed
    pub snapshots_broadcast: u64,
    /// Individual deliveries queued
    pub deliveries: u64,
    /// Raw status events received
    pub events_received: u64,
    /// Raw events for other accounts
    pub events_ignored: u64,
    /// Suppressed offline flickers
    pub flickers_suppressed: u64,
    /// Confirmed offline transitions
    pub offline_confirmed: u64,
}
