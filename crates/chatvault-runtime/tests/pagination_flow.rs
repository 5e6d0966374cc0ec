//! Pagination window semantics over a stored conversation.

use std::sync::Arc;

use chatvault_providers::ProviderRegistry;
use chatvault_runtime::{ConversationStore, Vault, VaultConfig};
use chatvault_testing::MemoryStore;
use chatvault_testing::fixtures::message_node;
use chatvault_types::MessageNode;

async fn seeded_vault(node_count: i64) -> (Vault, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mut nodes: Vec<MessageNode> = vec![message_node("c1", "n0", None, 0)];
    for i in 1..node_count {
        nodes.push(message_node(
            "c1",
            &format!("n{}", i),
            Some(&format!("n{}", i - 1)),
            i,
        ));
    }
    store.upsert_nodes("c1", &nodes, &[]).await.unwrap();
    let vault = Vault::with_store(store.clone(), ProviderRegistry::new(), VaultConfig::default());
    (vault, store)
}

#[tokio::test]
async fn recent_window_is_the_ascending_tail() {
    let (vault, _store) = seeded_vault(10).await;

    let page = vault.load_recent("c1", 4).await.unwrap();
    let order: Vec<i64> = page.nodes.iter().map(|n| n.order_index).collect();
    assert_eq!(order, [6, 7, 8, 9]);
    assert!(page.has_more);
    assert_eq!(page.oldest_order_index, Some(6));
}

#[tokio::test]
async fn small_conversation_fits_one_window() {
    let (vault, _store) = seeded_vault(3).await;

    let page = vault.load_recent("c1", 10).await.unwrap();
    assert_eq!(page.nodes.len(), 3);
    assert!(!page.has_more);
}

#[tokio::test]
async fn walking_older_pages_reassembles_the_conversation() {
    let (vault, _store) = seeded_vault(10).await;

    let first = vault.load_recent("c1", 4).await.unwrap();
    let mut window = first.nodes.clone();
    let mut cursor = first.oldest_order_index;
    let mut has_more = first.has_more;

    let mut rounds = 0;
    while has_more {
        rounds += 1;
        assert!(rounds < 10, "pagination must terminate");

        let page = vault
            .load_older("c1", cursor.expect("cursor while has_more"), 4)
            .await
            .unwrap();
        has_more = page.has_more;
        if let Some(oldest) = page.oldest_order_index {
            cursor = Some(oldest);
        }
        // Prepend-only merge: older pages go before the loaded window.
        window.splice(0..0, page.nodes);
    }

    let order: Vec<i64> = window.iter().map(|n| n.order_index).collect();
    assert_eq!(order, (0..10).collect::<Vec<i64>>());
}

#[tokio::test]
async fn exact_boundary_costs_one_empty_page() {
    // 8 nodes, window 4: the second backward page is full, so has_more
    // reports a (permitted) false positive and the third page is empty.
    let (vault, _store) = seeded_vault(8).await;

    let first = vault.load_recent("c1", 4).await.unwrap();
    assert!(first.has_more);

    let second = vault.load_older("c1", 4, 4).await.unwrap();
    assert_eq!(second.nodes.len(), 4);
    assert!(second.has_more, "a full page reports more even at the boundary");

    let third = vault.load_older("c1", 0, 4).await.unwrap();
    assert!(third.nodes.is_empty());
    assert!(!third.has_more);
    assert_eq!(third.oldest_order_index, None);
}
