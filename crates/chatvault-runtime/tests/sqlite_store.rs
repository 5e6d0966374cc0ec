//! The same sync flows, end to end over the SQLite driver.

use std::sync::Arc;

use anyhow::Result;
use chatvault_providers::ProviderRegistry;
use chatvault_runtime::{ConversationStore, SqliteStore, Vault, VaultConfig};
use chatvault_testing::ScriptedProvider;
use chatvault_testing::fixtures::{
    fetched_conversation, fetched_node, linear_exchange, with_attachment,
};
use chatvault_types::{ContentPart, Role};

const PROVIDER: &str = "openai_chat";

#[tokio::test]
async fn sync_is_idempotent_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(SqliteStore::open(&dir.path().join("vault.db"))?);
    let provider = Arc::new(ScriptedProvider::new(PROVIDER));
    provider.push_ok(linear_exchange(5));
    provider.push_ok(linear_exchange(5));
    let mut registry = ProviderRegistry::new();
    registry.register(provider);
    let vault = Vault::with_store(store.clone(), registry, VaultConfig::default());

    let first = vault.sync(PROVIDER, "c1").await?;
    assert_eq!(first.upserted, 5);
    let nodes_before = store.get_nodes("c1").await?;
    let conversation_before = store.get_conversation("c1").await?;

    let second = vault.sync(PROVIDER, "c1").await?;
    assert_eq!(second.upserted, 0);
    assert_eq!(store.get_nodes("c1").await?, nodes_before);
    assert_eq!(store.get_conversation("c1").await?, conversation_before);
    Ok(())
}

#[tokio::test]
async fn vault_reopens_with_archived_data() -> Result<()> {
    let dir = tempfile::tempdir()?;

    {
        let provider = Arc::new(ScriptedProvider::new(PROVIDER));
        provider.push_ok(linear_exchange(3));
        let mut registry = ProviderRegistry::new();
        registry.register(provider);
        let vault = Vault::open(dir.path(), registry)?;
        vault.sync(PROVIDER, "c1").await?;
    }

    // New process, same directory: the archive is still there.
    let vault = Vault::open(dir.path(), ProviderRegistry::new())?;
    let page = vault.load_recent("c1", 10).await?;
    assert_eq!(page.nodes.len(), 3);
    assert_eq!(vault.conversations().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn download_state_survives_resync_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(SqliteStore::open(&dir.path().join("vault.db"))?);
    let provider = Arc::new(ScriptedProvider::new(PROVIDER));

    let remote = fetched_conversation(
        "files",
        vec![
            fetched_node("root", None, 0, Role::User, "here"),
            with_attachment(
                fetched_node("reply", Some("root"), 1, Role::Assistant, "see file"),
                "file-1",
                "pdf",
            ),
        ],
    );
    provider.push_ok(remote.clone());
    let mut edited = remote;
    edited.nodes[1].content_parts = vec![ContentPart::text("see the corrected file")];
    provider.push_ok(edited);

    let mut registry = ProviderRegistry::new();
    registry.register(provider);
    let vault = Vault::with_store(store.clone(), registry, VaultConfig::default());

    vault.sync(PROVIDER, "c1").await?;
    let attachment_id = store.get_attachments("c1").await?[0].id.clone();
    vault
        .record_attachment_download(&attachment_id, "/vault/files/file-1.pdf")
        .await?;

    vault.sync(PROVIDER, "c1").await?;

    let attachment = store
        .get_attachment(&attachment_id)
        .await?
        .expect("attachment still archived");
    assert_eq!(attachment.local_path.as_deref(), Some("/vault/files/file-1.pdf"));
    Ok(())
}
