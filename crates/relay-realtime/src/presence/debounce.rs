//! Debounce controller for provisional offline reports.
//!
//! An offline report is only confirmed if it stands for the full delay.
//! The controller keeps at most one armed timer; arming always cancels the
//! previous one first.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A single armed timer.
///
/// Cancellation only wins if it happens before the delay elapses. Once the
/// callback has started, `cancel` has no effect.
#[derive(Debug)]
pub struct DebounceTimer {
    /// Sequence number assigned by the controller
    generation: u64,
    /// Cooperative cancellation for the sleeping task
    cancel: CancellationToken,
}

impl DebounceTimer {
    /// Schedule `callback` to run once after `delay` unless cancelled.
    pub fn arm<F, Fut>(generation: u64, delay: Duration, callback: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::trace!(generation, "Debounce timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    callback().await;
                }
            }
        });

        Self { generation, cancel }
    }

    /// Cancel the timer. A no-op if it already fired or was cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Sequence number of this timer.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owns the one pending "confirm offline" timer.
#[derive(Debug)]
pub struct Debouncer {
    /// Delay before a pending report is confirmed
    delay: Duration,
    /// The armed timer, if any
    pending: Option<DebounceTimer>,
    /// Generation handed to the next armed timer
    next_generation: u64,
}

impl Debouncer {
    /// Create a controller with no pending timer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_generation: 1,
        }
    }

    /// Cancel any pending timer, then arm a new one whose callback receives
    /// the new timer's generation. Returns that generation.
    pub fn arm<F, Fut>(&mut self, callback: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let generation = self.next_generation;
        self.next_generation += 1;
        self.pending = Some(DebounceTimer::arm(generation, self.delay, move || {
            callback(generation)
        }));
        generation
    }

    /// Cancel and forget the pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether `generation` belongs to the currently armed timer.
    pub fn is_current(&self, generation: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|timer| timer.generation() == generation)
    }

    /// Forget the pending timer after it fired.
    pub fn settle(&mut self, generation: u64) {
        if self.is_current(generation) {
            self.pending = None;
        }
    }

    /// Whether a timer is armed.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
