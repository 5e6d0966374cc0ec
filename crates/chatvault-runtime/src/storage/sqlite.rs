use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chatvault_index::Database;
use chatvault_types::{Attachment, Conversation, MessageNode, SyncState};

use crate::store::{ConversationStore, StoreResult};

/// SQLite-backed store.
///
/// rusqlite is synchronous; every call here is a short local transaction,
/// so calls run inline behind a mutex instead of hopping to a blocking
/// pool.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::open(path).map_err(crate::error::StoreError::from)?;
        Ok(Self { db: Mutex::new(db) })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::open_in_memory().map_err(crate::error::StoreError::from)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn get_conversation(&self, conversation_id: &str) -> StoreResult<Option<Conversation>> {
        Ok(self.db().get_conversation(conversation_id)?)
    }

    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>> {
        Ok(self.db().list_conversations()?)
    }

    async fn upsert_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        Ok(self.db().upsert_conversation(conversation)?)
    }

    async fn set_conversation_current_node(
        &self,
        conversation_id: &str,
        node_id: Option<&str>,
    ) -> StoreResult<()> {
        Ok(self.db().set_current_node(conversation_id, node_id)?)
    }

    async fn get_nodes(&self, conversation_id: &str) -> StoreResult<Vec<MessageNode>> {
        Ok(self.db().get_nodes(conversation_id)?)
    }

    async fn nodes_page_recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<MessageNode>> {
        Ok(self.db().nodes_page_recent(conversation_id, limit)?)
    }

    async fn nodes_page_before(
        &self,
        conversation_id: &str,
        before_order_index: i64,
        limit: usize,
    ) -> StoreResult<Vec<MessageNode>> {
        Ok(self
            .db()
            .nodes_page_before(conversation_id, before_order_index, limit)?)
    }

    async fn count_nodes(&self, conversation_id: &str) -> StoreResult<usize> {
        Ok(self.db().count_nodes(conversation_id)?)
    }

    async fn upsert_nodes(
        &self,
        _conversation_id: &str,
        nodes: &[MessageNode],
        attachments: &[Attachment],
    ) -> StoreResult<usize> {
        Ok(self.db().upsert_nodes(nodes, attachments)?)
    }

    async fn get_attachment(&self, attachment_id: &str) -> StoreResult<Option<Attachment>> {
        Ok(self.db().get_attachment(attachment_id)?)
    }

    async fn get_attachments(&self, conversation_id: &str) -> StoreResult<Vec<Attachment>> {
        Ok(self.db().attachments_for_conversation(conversation_id)?)
    }

    async fn set_attachment_local_path(
        &self,
        attachment_id: &str,
        path: &str,
    ) -> StoreResult<()> {
        Ok(self.db().set_attachment_local_path(attachment_id, path)?)
    }

    async fn get_sync_state(
        &self,
        provider_id: &str,
        conversation_id: &str,
    ) -> StoreResult<Option<SyncState>> {
        Ok(self.db().get_sync_state(provider_id, conversation_id)?)
    }

    async fn set_sync_state(&self, state: &SyncState) -> StoreResult<()> {
        Ok(self.db().set_sync_state(state)?)
    }
}
