//! scholarsync-sync: mirrors planner state into a per-user remote document.
//!
//! The embedding application supplies the collaborators (document store,
//! identity provider, legacy snapshots) and drives `PlannerSession` from its
//! event loop; everything here is synchronous and clock-injected.

pub mod identity;
pub mod legacy;
pub mod remote;
pub mod session;

pub use identity::{Identity, IdentityProvider};
pub use legacy::{LegacySnapshots, NoLegacySnapshots};
pub use remote::{DocumentStore, SnapshotEvent, StoreError, WriteMode};
pub use session::{DEBOUNCE_MS, Notice, PlannerSession, SyncIndicator, SyncState};
