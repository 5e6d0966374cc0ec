use std::sync::Arc;

use chatvault_types::MessageNode;

use crate::error::Result;
use crate::store::ConversationStore;

/// One window of a conversation, ascending by order_index.
#[derive(Debug, Clone)]
pub struct Page {
    pub nodes: Vec<MessageNode>,
    pub has_more: bool,
    /// Cursor for the next backward page; `None` for an empty window.
    pub oldest_order_index: Option<i64>,
}

/// Serves recency windows over raw node order.
///
/// Branch resolution happens over the loaded window on the caller's
/// side: backward pages are prepended to the window and the resolver
/// re-runs over the grown whole. `has_more` on backward pages trades
/// precision for liveness: a full page reports more even when the
/// conversation ends exactly at the boundary, costing at most one empty
/// follow-up request and never omitting a node.
pub struct Paginator {
    store: Arc<dyn ConversationStore>,
}

impl Paginator {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// The `limit` newest nodes, ascending.
    pub async fn load_recent(&self, conversation_id: &str, limit: usize) -> Result<Page> {
        let nodes = self.store.nodes_page_recent(conversation_id, limit).await?;
        let total = self.store.count_nodes(conversation_id).await?;
        Ok(Page {
            has_more: total > limit,
            oldest_order_index: nodes.first().map(|n| n.order_index),
            nodes,
        })
    }

    /// Up to `limit` nodes older than the cursor, ascending.
    pub async fn load_older(
        &self,
        conversation_id: &str,
        before_order_index: i64,
        limit: usize,
    ) -> Result<Page> {
        let nodes = self
            .store
            .nodes_page_before(conversation_id, before_order_index, limit)
            .await?;
        Ok(Page {
            has_more: limit > 0 && nodes.len() == limit,
            oldest_order_index: nodes.first().map(|n| n.order_index),
            nodes,
        })
    }
}
