// Runtime layer - orchestration between providers, the engine, and the store

mod client;
mod config;
mod error;
mod flight;
mod page;
mod storage;
mod store;
mod sync;

pub use client::Vault;
pub use config::{VaultConfig, resolve_vault_path};
pub use error::{Error, Result, StoreError};
pub use page::{Page, Paginator};
pub use storage::SqliteStore;
pub use store::{ConversationStore, StoreResult};
pub use sync::{SyncCoordinator, SyncReport};

// Pure engine API re-exported for the presentation layer
pub use chatvault_engine::{
    ConversationTree, MalformedTree, SelectionError, build_tree, resolve_path,
    update_branch_selection,
};
