//! Individual observer handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique observer identifier
pub type ObserverId = Uuid;

/// Failure to hand a message to one observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportSendError {
    /// The observer's connection task is gone.
    #[error("observer channel closed")]
    Closed,
    /// The observer is not draining its buffer.
    #[error("observer send buffer full")]
    Full,
}

/// A handle to one connected observer.
///
/// Holds the sender side of the observer's outbound queue. The connection
/// task owns the receiver; dropping the handle ends that task's queue.
#[derive(Debug)]
pub struct ObserverHandle {
    /// Unique observer ID
    pub id: ObserverId,
    /// Remote peer, for logging
    pub peer: Option<String>,
    /// Sender for serialized snapshots
    sender: mpsc::Sender<String>,
    /// When the observer connected
    pub connected_at: DateTime<Utc>,
}

impl ObserverHandle {
    /// Create a handle and the receiver its connection task drains.
    pub fn new(peer: Option<String>, buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(buffer);
        let handle = Self {
            id: Uuid::new_v4(),
            peer,
            sender,
            connected_at: Utc::now(),
        };
        (handle, receiver)
    }

    /// Queue a message without waiting.
    pub fn send(&self, payload: String) -> Result<(), TransportSendError> {
        self.sender.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportSendError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportSendError::Closed,
        })
    }

    /// Whether the connection task has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Serializable summary of this observer.
    pub fn info(&self) -> ObserverInfo {
        ObserverInfo {
            id: self.id,
            peer: self.peer.clone(),
            connected_at: self.connected_at,
        }
    }
}

/// Snapshot of observer info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverInfo {
    /// Observer ID
    pub id: ObserverId,
    /// Remote peer
    pub peer: Option<String>,
    /// Connected at
    pub connected_at: DateTime<Utc>,
}
