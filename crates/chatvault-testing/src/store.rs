//! In-memory `ConversationStore` for flow tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chatvault_runtime::{ConversationStore, StoreResult};
use chatvault_types::{Attachment, Conversation, MessageNode, SyncState};

#[derive(Default)]
struct State {
    conversations: HashMap<String, Conversation>,
    nodes: HashMap<String, MessageNode>,
    attachments: HashMap<String, Attachment>,
    sync_states: HashMap<(String, String), SyncState>,
}

/// In-memory store with the same upsert semantics as the SQLite driver:
/// updates keep `order_index`/`created_at`, attachment upserts never null
/// a set `local_path`, and the sync-side conversation upsert keeps an
/// existing pinned leaf.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn sorted_nodes(state: &State, conversation_id: &str) -> Vec<MessageNode> {
        let mut nodes: Vec<MessageNode> = state
            .nodes
            .values()
            .filter(|n| n.conversation_id == conversation_id)
            .cloned()
            .collect();
        nodes.sort_by_key(|n| n.order_index);
        nodes
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get_conversation(&self, conversation_id: &str) -> StoreResult<Option<Conversation>> {
        Ok(self.lock().conversations.get(conversation_id).cloned())
    }

    async fn list_conversations(&self) -> StoreResult<Vec<Conversation>> {
        let mut listed: Vec<Conversation> = self.lock().conversations.values().cloned().collect();
        listed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(listed)
    }

    async fn upsert_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        let mut state = self.lock();
        let mut incoming = conversation.clone();
        if let Some(existing) = state.conversations.get(&conversation.id)
            && existing.current_node_id.is_some()
        {
            incoming.current_node_id = existing.current_node_id.clone();
        }
        state.conversations.insert(incoming.id.clone(), incoming);
        Ok(())
    }

    async fn set_conversation_current_node(
        &self,
        conversation_id: &str,
        node_id: Option<&str>,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        if let Some(conversation) = state.conversations.get_mut(conversation_id) {
            conversation.current_node_id = node_id.map(str::to_string);
        }
        Ok(())
    }

    async fn get_nodes(&self, conversation_id: &str) -> StoreResult<Vec<MessageNode>> {
        Ok(Self::sorted_nodes(&self.lock(), conversation_id))
    }

    async fn nodes_page_recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<MessageNode>> {
        let nodes = Self::sorted_nodes(&self.lock(), conversation_id);
        let skip = nodes.len().saturating_sub(limit);
        Ok(nodes.into_iter().skip(skip).collect())
    }

    async fn nodes_page_before(
        &self,
        conversation_id: &str,
        before_order_index: i64,
        limit: usize,
    ) -> StoreResult<Vec<MessageNode>> {
        let older: Vec<MessageNode> = Self::sorted_nodes(&self.lock(), conversation_id)
            .into_iter()
            .filter(|n| n.order_index < before_order_index)
            .collect();
        let skip = older.len().saturating_sub(limit);
        Ok(older.into_iter().skip(skip).collect())
    }

    async fn count_nodes(&self, conversation_id: &str) -> StoreResult<usize> {
        Ok(Self::sorted_nodes(&self.lock(), conversation_id).len())
    }

    async fn upsert_nodes(
        &self,
        _conversation_id: &str,
        nodes: &[MessageNode],
        attachments: &[Attachment],
    ) -> StoreResult<usize> {
        let mut state = self.lock();

        for node in nodes {
            let mut incoming = node.clone();
            if let Some(existing) = state.nodes.get(&node.id) {
                incoming.order_index = existing.order_index;
                incoming.created_at = existing.created_at;
            }
            state.nodes.insert(incoming.id.clone(), incoming);
        }

        for attachment in attachments {
            let mut incoming = attachment.clone();
            if let Some(existing) = state.attachments.get(&attachment.id)
                && existing.local_path.is_some()
            {
                incoming.local_path = existing.local_path.clone();
            }
            state.attachments.insert(incoming.id.clone(), incoming);
        }

        Ok(nodes.len())
    }

    async fn get_attachment(&self, attachment_id: &str) -> StoreResult<Option<Attachment>> {
        Ok(self.lock().attachments.get(attachment_id).cloned())
    }

    async fn get_attachments(&self, conversation_id: &str) -> StoreResult<Vec<Attachment>> {
        let state = self.lock();
        let mut found: Vec<Attachment> = state
            .attachments
            .values()
            .filter(|a| {
                state
                    .nodes
                    .get(&a.message_id)
                    .is_some_and(|n| n.conversation_id == conversation_id)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn set_attachment_local_path(&self, attachment_id: &str, path: &str) -> StoreResult<()> {
        let mut state = self.lock();
        if let Some(attachment) = state.attachments.get_mut(attachment_id) {
            attachment.local_path = Some(path.to_string());
        }
        Ok(())
    }

    async fn get_sync_state(
        &self,
        provider_id: &str,
        conversation_id: &str,
    ) -> StoreResult<Option<SyncState>> {
        let key = (provider_id.to_string(), conversation_id.to_string());
        Ok(self.lock().sync_states.get(&key).cloned())
    }

    async fn set_sync_state(&self, state: &SyncState) -> StoreResult<()> {
        let key = (state.provider_id.clone(), state.conversation_id.clone());
        self.lock().sync_states.insert(key, state.clone());
        Ok(())
    }
}
