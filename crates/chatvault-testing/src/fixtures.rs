//! Reproducible sample data builders.
//!
//! All timestamps derive from one fixed instant so fixture-driven
//! assertions never depend on the wall clock.

use chatvault_providers::{FetchedAttachment, FetchedConversation, FetchedNode};
use chatvault_types::{ContentPart, MessageNode, Role};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Fixed base instant for fixture timestamps.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

pub fn fetched_node(
    provider_node_id: &str,
    parent: Option<&str>,
    offset_secs: i64,
    role: Role,
    text: &str,
) -> FetchedNode {
    FetchedNode {
        provider_node_id: provider_node_id.to_string(),
        parent_provider_node_id: parent.map(str::to_string),
        role,
        content_parts: vec![ContentPart::text(text)],
        created_at: base_time() + Duration::seconds(offset_secs),
        attachments: vec![],
    }
}

pub fn with_attachment(mut node: FetchedNode, file_id: &str, kind: &str) -> FetchedNode {
    node.attachments.push(FetchedAttachment {
        file_id: file_id.to_string(),
        kind: kind.to_string(),
    });
    node
}

pub fn fetched_conversation(title: &str, nodes: Vec<FetchedNode>) -> FetchedConversation {
    FetchedConversation {
        title: title.to_string(),
        nodes,
    }
}

/// Linear exchange of `len` nodes: n0 (user) -> n1 (assistant) -> ...
pub fn linear_exchange(len: usize) -> FetchedConversation {
    let mut nodes = Vec::with_capacity(len);
    for i in 0..len {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        let parent = (i > 0).then(|| format!("n{}", i - 1));
        nodes.push(fetched_node(
            &format!("n{}", i),
            parent.as_deref(),
            i as i64,
            role,
            &format!("message {}", i),
        ));
    }
    fetched_conversation("linear", nodes)
}

/// The regeneration shape: root question with two answer variants.
///
/// `root -> question -> {answer-v1, answer-v2}`, v2 created later.
pub fn branched_conversation() -> FetchedConversation {
    fetched_conversation(
        "branched",
        vec![
            fetched_node("root", None, 0, Role::System, "system"),
            fetched_node("question", Some("root"), 1, Role::User, "why?"),
            fetched_node("answer-v1", Some("question"), 2, Role::Assistant, "because"),
            fetched_node("answer-v2", Some("question"), 3, Role::Assistant, "well, actually"),
        ],
    )
}

/// Stored-node builder for seeding a store directly, bypassing sync.
pub fn message_node(
    conversation_id: &str,
    id: &str,
    parent: Option<&str>,
    order_index: i64,
) -> MessageNode {
    MessageNode {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        parent_id: parent.map(str::to_string),
        role: Role::Assistant,
        content_parts: vec![ContentPart::text(id)],
        order_index,
        provider_node_id: format!("p-{}", id),
        created_at: base_time() + Duration::seconds(order_index),
    }
}
