//! Legacy local snapshot source, consulted once per identity.
//!
//! Before the remote store existed, each user's planner lived in a local
//! key-value entry. On the first-ever attach where no remote document exists,
//! that entry (if any) is migrated remotely verbatim and never read again.

use anyhow::Result;
use serde_json::Value;

pub trait LegacySnapshots {
    /// Take (and consume) the stored snapshot for a user, if one exists.
    /// The raw wire value is returned; the session decodes it leniently.
    fn take(&mut self, user_id: &str) -> Result<Option<Value>>;
}

/// For embedders with no legacy data to migrate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLegacySnapshots;

impl LegacySnapshots for NoLegacySnapshots {
    fn take(&mut self, _user_id: &str) -> Result<Option<Value>> {
        Ok(None)
    }
}
