use std::fmt;

use chatvault_engine::MalformedTree;
use chatvault_providers::FetchError;

/// Result type for chatvault-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure inside a store backend, behind the narrow contract.
#[derive(Debug)]
pub enum StoreError {
    /// Backend rejected or failed the operation
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Row exists but could not be decoded into the domain model
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(err) => write!(f, "Store backend error: {}", err),
            StoreError::Corrupt(msg) => write!(f, "Corrupt store row: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Backend(err) => Some(err.as_ref()),
            StoreError::Corrupt(_) => None,
        }
    }
}

impl From<chatvault_index::Error> for StoreError {
    fn from(err: chatvault_index::Error) -> Self {
        match err {
            chatvault_index::Error::Corrupt(msg) => StoreError::Corrupt(msg),
            other => StoreError::Backend(Box::new(other)),
        }
    }
}

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Provider fetch failed; the archive keeps serving the last synced state
    Fetch(FetchError),

    /// Node list is structurally invalid; nothing was written
    Tree(MalformedTree),

    /// A sync for this key is already in flight; retry later
    AlreadySyncing {
        provider_id: String,
        conversation_id: String,
    },

    /// Store backend failure
    Store(StoreError),

    /// Configuration error
    Config(String),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Fetch(err) => write!(f, "Fetch error: {}", err),
            Error::Tree(err) => write!(f, "Malformed tree: {}", err),
            Error::AlreadySyncing {
                provider_id,
                conversation_id,
            } => write!(
                f,
                "Sync already in flight for {}/{}",
                provider_id, conversation_id
            ),
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Fetch(err) => Some(err),
            Error::Tree(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::AlreadySyncing { .. } | Error::Config(_) => None,
        }
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::Fetch(err)
    }
}

impl From<MalformedTree> for Error {
    fn from(err: MalformedTree) -> Self {
        Error::Tree(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
