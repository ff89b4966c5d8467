//! Account session trait for pluggable messaging-network backends.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::events::{AccountStatus, RawStatusEvent};
use crate::result::AppResult;
use crate::types::identity::Identity;

/// Live, unbounded feed of raw status events. The stream ending means the
/// session lost its connection to the network.
pub type StatusEventStream = BoxStream<'static, RawStatusEvent>;

/// Trait for the authorized account session that observes the network.
///
/// Implementations own whatever connection the network needs; the relay
/// only resolves one identity through them and consumes their event feed.
#[async_trait]
pub trait AccountSession: Send + Sync + std::fmt::Debug + 'static {
    /// Look an identity up directly (phone number or username).
    ///
    /// Fails with a `Resolution` error when the network does not know the
    /// identifier from this session's point of view.
    async fn resolve_identity(&self, identifier: &str) -> AppResult<Identity>;

    /// Register the identifier as a contact under `display_name`, then
    /// resolve it.
    async fn import_and_resolve(&self, identifier: &str, display_name: &str)
    -> AppResult<Identity>;

    /// Current status of a resolved identity.
    async fn current_status(&self, identity: &Identity) -> AppResult<AccountStatus>;

    /// Subscribe to the live status feed for all accounts visible to the
    /// session.
    async fn status_events(&self) -> AppResult<StatusEventStream>;
}
