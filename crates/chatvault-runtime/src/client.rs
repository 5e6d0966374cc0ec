use std::path::Path;
use std::sync::Arc;

use chatvault_engine::{build_tree, resolve_path};
use chatvault_providers::ProviderRegistry;
use chatvault_types::{Attachment, BranchSelections, Conversation, MessageNode};

use crate::config::VaultConfig;
use crate::error::Result;
use crate::page::{Page, Paginator};
use crate::storage::SqliteStore;
use crate::store::ConversationStore;
use crate::sync::{SyncCoordinator, SyncReport};

/// Facade over the archive: sync, pagination, and display-path reads.
///
/// Cheap to share behind an `Arc`; all operations take `&self`.
pub struct Vault {
    store: Arc<dyn ConversationStore>,
    coordinator: SyncCoordinator,
    paginator: Paginator,
    config: VaultConfig,
}

impl Vault {
    /// Open (or create) a SQLite-backed vault under `data_dir`.
    pub fn open(data_dir: &Path, providers: ProviderRegistry) -> Result<Self> {
        let config = VaultConfig::load_from(&data_dir.join("config.toml"))?;
        let store = Arc::new(SqliteStore::open(&data_dir.join("chatvault.db"))?);
        Ok(Self::with_store(store, providers, config))
    }

    /// Assemble a vault over any store implementation.
    pub fn with_store(
        store: Arc<dyn ConversationStore>,
        providers: ProviderRegistry,
        config: VaultConfig,
    ) -> Self {
        let providers = Arc::new(providers);
        Self {
            coordinator: SyncCoordinator::new(store.clone(), providers),
            paginator: Paginator::new(store.clone()),
            store,
            config,
        }
    }

    /// Pull a conversation from its provider and reconcile the archive.
    ///
    /// Not cancelable mid-flight: a slow result can resolve after newer
    /// requests have been issued. Callers that overlap syncs should tag
    /// each request with a monotonic token and drop completions whose
    /// token is no longer the latest.
    pub async fn sync(&self, provider_id: &str, conversation_id: &str) -> Result<SyncReport> {
        self.coordinator.sync(provider_id, conversation_id).await
    }

    /// The newest window of a conversation, ascending.
    pub async fn load_recent(&self, conversation_id: &str, limit: usize) -> Result<Page> {
        self.paginator.load_recent(conversation_id, limit).await
    }

    /// The next window backwards from a cursor, ascending.
    pub async fn load_older(
        &self,
        conversation_id: &str,
        before_order_index: i64,
        limit: usize,
    ) -> Result<Page> {
        self.paginator
            .load_older(conversation_id, before_order_index, limit)
            .await
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub async fn conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self.store.get_conversation(conversation_id).await?)
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        Ok(self.store.list_conversations().await?)
    }

    /// Resolve the display path over the whole stored conversation,
    /// honoring branch selections and the stored pinned leaf. Empty for
    /// a conversation that has never synced.
    pub async fn display_path(
        &self,
        conversation_id: &str,
        selections: &BranchSelections,
    ) -> Result<Vec<MessageNode>> {
        let nodes = self.store.get_nodes(conversation_id).await?;
        if nodes.is_empty() {
            return Ok(Vec::new());
        }
        let pinned = self
            .store
            .get_conversation(conversation_id)
            .await?
            .and_then(|c| c.current_node_id);

        let tree = build_tree(&nodes)?;
        let path = resolve_path(&tree, selections, pinned.as_deref());
        Ok(path.into_iter().cloned().collect())
    }

    /// Viewer op: pin (or clear) the leaf the display path steers to.
    pub async fn pin_leaf(&self, conversation_id: &str, node_id: Option<&str>) -> Result<()> {
        Ok(self
            .store
            .set_conversation_current_node(conversation_id, node_id)
            .await?)
    }

    pub async fn attachments(&self, conversation_id: &str) -> Result<Vec<Attachment>> {
        Ok(self.store.get_attachments(conversation_id).await?)
    }

    /// Download collaborator op: record where an attachment landed.
    pub async fn record_attachment_download(
        &self,
        attachment_id: &str,
        path: &str,
    ) -> Result<()> {
        Ok(self
            .store
            .set_attachment_local_path(attachment_id, path)
            .await?)
    }
}
