use async_trait::async_trait;
use chatvault_types::{Attachment, Conversation, MessageNode, SyncState};

use crate::error::StoreError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Narrow operation contract the core holds on the persistent store.
///
/// Implementations must provide per-call atomicity: `upsert_nodes` is one
/// transaction, and concurrent readers observe either the pre- or
/// post-sync snapshot, never a torn one. Readers may run while a sync is
/// in flight.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_conversation(&self, conversation_id: &str) -> StoreResult<Option<Conversation>>;

    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>>;

    async fn upsert_conversation(&self, conversation: &Conversation) -> StoreResult<()>;

    /// Viewer op: move (or clear) the pinned leaf.
    async fn set_conversation_current_node(
        &self,
        conversation_id: &str,
        node_id: Option<&str>,
    ) -> StoreResult<()>;

    /// All nodes of a conversation, ascending by order_index.
    async fn get_nodes(&self, conversation_id: &str) -> StoreResult<Vec<MessageNode>>;

    /// The `limit` highest-order_index nodes, ascending.
    async fn nodes_page_recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<MessageNode>>;

    /// Up to `limit` nodes strictly below the cursor, ascending.
    async fn nodes_page_before(
        &self,
        conversation_id: &str,
        before_order_index: i64,
        limit: usize,
    ) -> StoreResult<Vec<MessageNode>>;

    async fn count_nodes(&self, conversation_id: &str) -> StoreResult<usize>;

    /// Atomic node+attachment upsert; returns the number of node rows
    /// written. Existing rows keep their `order_index` and `created_at`,
    /// and an attachment's non-null `local_path` is never overwritten
    /// through this path.
    async fn upsert_nodes(
        &self,
        conversation_id: &str,
        nodes: &[MessageNode],
        attachments: &[Attachment],
    ) -> StoreResult<usize>;

    async fn get_attachment(&self, attachment_id: &str) -> StoreResult<Option<Attachment>>;

    /// All attachments in a conversation.
    async fn get_attachments(&self, conversation_id: &str) -> StoreResult<Vec<Attachment>>;

    /// Download collaborator op: record where the blob landed locally.
    async fn set_attachment_local_path(&self, attachment_id: &str, path: &str) -> StoreResult<()>;

    async fn get_sync_state(
        &self,
        provider_id: &str,
        conversation_id: &str,
    ) -> StoreResult<Option<SyncState>>;

    async fn set_sync_state(&self, state: &SyncState) -> StoreResult<()>;
}
