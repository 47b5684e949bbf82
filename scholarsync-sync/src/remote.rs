//! Remote document store collaborator.
//!
//! One JSON document per user. The store is a black box behind this trait;
//! the embedding adapter bridges whatever transport it has (websocket
//! listener, polling loop) to `PlannerSession::handle_snapshot`, echoing the
//! epoch it was subscribed with so stale deliveries can be told apart.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Reported distinctly: the fix is reauthentication, not retrying.
    #[error("permission denied")]
    PermissionDenied,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("document encoding failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl StoreError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied)
    }
}

/// Merge leaves fields absent from the payload untouched remotely; Replace
/// writes the document verbatim. Debounced pushes merge, the one-shot legacy
/// migration replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Merge,
    Replace,
}

/// One delivery on an active subscription.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    /// The document exists; raw wire value, decoded leniently by the session.
    Document(Value),
    /// No document yet for this user (first-ever login).
    Missing,
    Failed(StoreError),
}

pub trait DocumentStore {
    /// Start snapshot delivery for `key`. Deliveries must carry `epoch` back.
    fn subscribe(&mut self, key: &str, epoch: u64);

    /// Stop delivery for a previous `subscribe`. Called before any new
    /// subscribe when identity changes, and on logout.
    fn unsubscribe(&mut self, epoch: u64);

    fn write(&mut self, key: &str, document: &Value, mode: WriteMode) -> Result<(), StoreError>;
}
