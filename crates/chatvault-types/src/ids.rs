use uuid::Uuid;

// Fixed namespace for deterministic local ids (UUIDv5). Part of the
// on-disk format: changing it orphans every archived row.
const VAULT_NAMESPACE: Uuid = Uuid::from_u128(0x8f1c_2a77_5de4_4b02_9c10_53a6_e903_11d7);

/// Local id for a provider node within a conversation.
///
/// Deterministic, so the same remote node always maps to the same local
/// row no matter how often it is re-fetched.
pub fn node_id(conversation_id: &str, provider_node_id: &str) -> String {
    let name = format!("{}\u{1f}{}", conversation_id, provider_node_id);
    Uuid::new_v5(&VAULT_NAMESPACE, name.as_bytes()).to_string()
}

/// Local id for an attachment on a message.
pub fn attachment_id(message_id: &str, file_id: &str) -> String {
    let name = format!("{}\u{1f}{}", message_id, file_id);
    Uuid::new_v5(&VAULT_NAMESPACE, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_stable() {
        assert_eq!(node_id("c1", "n1"), node_id("c1", "n1"));
        assert_ne!(node_id("c1", "n1"), node_id("c2", "n1"));
        assert_ne!(node_id("c1", "n1"), node_id("c1", "n2"));
    }

    #[test]
    fn separator_prevents_concatenation_collisions() {
        assert_ne!(node_id("ab", "c"), node_id("a", "bc"));
        assert_ne!(attachment_id("ab", "c"), attachment_id("a", "bc"));
    }
}
