use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker role of a message node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            "tool" => Ok(Role::Tool),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// One unit of message content.
///
/// Providers emit heterogeneous part types; parts the core does not
/// interpret are carried verbatim so they survive re-sync round trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Unknown { raw: serde_json::Value },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

/// Single message in a conversation tree.
///
/// `parent_id` links form a tree rooted at the one node with
/// `parent_id = None`; a conversation has exactly one root.
/// `order_index` is monotonic within a conversation and is never
/// renumbered once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageNode {
    pub id: String,
    pub conversation_id: String,
    pub parent_id: Option<String>,
    pub role: Role,
    pub content_parts: Vec<ContentPart>,
    pub order_index: i64,
    /// Provider-side node id, the dedup key across re-syncs.
    pub provider_node_id: String,
    pub created_at: DateTime<Utc>,
}

impl MessageNode {
    /// Compare the fields that follow the remote. Identity and ordering
    /// (`id`, `order_index`, `created_at`) are assigned locally and stay
    /// put even when the remote content changes.
    pub fn content_eq(&self, other: &Self) -> bool {
        self.role == other.role
            && self.content_parts == other.content_parts
            && self.parent_id == other.parent_id
    }
}
