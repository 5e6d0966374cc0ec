use async_trait::async_trait;
use chatvault_types::{ContentPart, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Normalized fetch contract implemented by one provider adapter.
///
/// Responsibilities:
/// - Talk to the provider's API with whatever session state it holds
/// - Flatten the proprietary conversation format into [`FetchedNode`]s
/// - Surface network/auth failures as [`FetchError`](crate::FetchError)
///
/// The archive core never sees provider wire formats; this trait is the
/// seam. Adapters live in the embedding application because they carry
/// credentials.
#[async_trait]
pub trait ConversationProvider: Send + Sync {
    /// Unique provider id (e.g. "openai_chat")
    fn id(&self) -> &'static str;

    /// Fetch one conversation's metadata plus its flat node list.
    async fn fetch_conversation(&self, conversation_id: &str) -> Result<FetchedConversation>;
}

/// Conversation payload as normalized by a provider adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedConversation {
    pub title: String,
    pub nodes: Vec<FetchedNode>,
}

/// Flat node as delivered by a provider.
///
/// No ordering is assumed; parent links are provider-side ids that the
/// sync path resolves into local ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedNode {
    pub provider_node_id: String,
    pub parent_provider_node_id: Option<String>,
    pub role: Role,
    pub content_parts: Vec<ContentPart>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<FetchedAttachment>,
}

/// Attachment descriptor on a fetched node. `file_id` is the remote blob
/// handle; downloading is a separate collaborator's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedAttachment {
    pub file_id: String,
    pub kind: String,
}
