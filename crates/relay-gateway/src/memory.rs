//! In-memory account session for development and testing.
//!
//! Simulates the network without a gateway: identities are registered up
//! front, statuses are set by hand, and status events are pushed through
//! [`MemorySession::push`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;

use relay_core::error::AppError;
use relay_core::events::{AccountStatus, RawStatusEvent};
use relay_core::result::AppResult;
use relay_core::traits::{AccountSession, StatusEventStream};
use relay_core::types::{AccountId, Identity};

/// Scriptable account session.
#[derive(Debug)]
pub struct MemorySession {
    /// Identifiers resolvable by direct lookup
    known: Mutex<HashMap<String, Identity>>,
    /// Identifiers that only resolve after a contact import
    importable: Mutex<HashMap<String, Identity>>,
    /// Current status per account
    statuses: Mutex<HashMap<AccountId, AccountStatus>>,
    /// Feed sender; dropping it ends the event stream
    events_tx: Mutex<Option<mpsc::UnboundedSender<RawStatusEvent>>>,
    /// Feed receiver, handed out once
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<RawStatusEvent>>>,
    /// Number of import attempts made
    imports: AtomicUsize,
}

impl MemorySession {
    /// Create an empty session
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            known: Mutex::new(HashMap::new()),
            importable: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            events_tx: Mutex::new(Some(tx)),
            events_rx: Mutex::new(Some(rx)),
            imports: AtomicUsize::new(0),
        }
    }

    /// Make `identifier` resolvable by direct lookup
    pub fn with_contact(self, identifier: &str, identity: Identity, status: AccountStatus) -> Self {
        self.set_status(identity.id, status);
        self.known
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(identifier.to_string(), identity);
        self
    }

    /// Make `identifier` resolvable only through the import fallback
    pub fn with_importable(
        self,
        identifier: &str,
        identity: Identity,
        status: AccountStatus,
    ) -> Self {
        self.set_status(identity.id, status);
        self.importable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(identifier.to_string(), identity);
        self
    }

    /// Overwrite the status reported for an account
    pub fn set_status(&self, account_id: AccountId, status: AccountStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(account_id, status);
    }

    /// Push a raw event into the live feed. Returns `false` once the feed
    /// has been disconnected.
    pub fn push(&self, event: RawStatusEvent) -> bool {
        if let Some(tx) = self.events_tx.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            return tx.send(event).is_ok();
        }
        false
    }

    /// End the live feed, as a dropped network connection would
    pub fn disconnect(&self) {
        self.events_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        tracing::info!("[MemorySession] Feed disconnected");
    }

    /// Number of import fallbacks attempted
    pub fn import_count(&self) -> usize {
        self.imports.load(Ordering::SeqCst)
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountSession for MemorySession {
    async fn resolve_identity(&self, identifier: &str) -> AppResult<Identity> {
        self.known
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(identifier)
            .cloned()
            .ok_or_else(|| AppError::resolution(format!("No contact matches '{identifier}'")))
    }

    async fn import_and_resolve(
        &self,
        identifier: &str,
        display_name: &str,
    ) -> AppResult<Identity> {
        self.imports.fetch_add(1, Ordering::SeqCst);

        let imported = self
            .importable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(identifier);

        match imported {
            Some(identity) => {
                tracing::info!(
                    "[MemorySession] Imported '{}' as '{}'",
                    identifier,
                    display_name
                );
                self.known
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(identifier.to_string(), identity.clone());
                Ok(identity)
            }
            None => Err(AppError::resolution(format!(
                "Import of '{identifier}' returned no account"
            ))),
        }
    }

    async fn current_status(&self, identity: &Identity) -> AppResult<AccountStatus> {
        Ok(self
            .statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&identity.id)
            .copied()
            .unwrap_or_else(AccountStatus::offline_unknown))
    }

    async fn status_events(&self) -> AppResult<StatusEventStream> {
        let rx = self
            .events_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| AppError::internal("MemorySession feed already subscribed"))?;

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(stream.boxed())
    }
}
