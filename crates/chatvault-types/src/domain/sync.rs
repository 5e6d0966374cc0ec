use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sync bookkeeping, one record per (provider, conversation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    pub provider_id: String,
    pub conversation_id: String,
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Advisory mirror of the in-process flight table. A stale `true`
    /// left behind by a crashed process is ignored on the next run.
    pub is_syncing: bool,
}

/// Key identifying one sync flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncKey {
    pub provider_id: String,
    pub conversation_id: String,
}

impl SyncKey {
    pub fn new(provider_id: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            conversation_id: conversation_id.into(),
        }
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider_id, self.conversation_id)
    }
}
