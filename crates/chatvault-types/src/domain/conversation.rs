use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation row owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub provider_id: String,
    pub title: String,
    /// Advisory pinned leaf for branch resolution. Set by the viewer, may
    /// be stale relative to the latest sync.
    pub current_node_id: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}
