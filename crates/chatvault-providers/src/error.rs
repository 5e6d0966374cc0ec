use std::fmt;

/// Result type for provider fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Error types that can occur while fetching from a provider
///
/// Adapters own their timeouts and retries; whatever survives them lands
/// here, and the sync path treats every variant the same way: abort with
/// no store mutation, keep serving the last synced state.
#[derive(Debug)]
pub enum FetchError {
    /// Network failure or timeout
    Network(String),

    /// Session credentials rejected or expired
    Auth(String),

    /// Response payload could not be decoded
    Decode(serde_json::Error),

    /// Provider-side failure (unknown conversation, server error)
    Provider(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Auth(msg) => write!(f, "Auth error: {}", msg),
            FetchError::Decode(err) => write!(f, "Decode error: {}", err),
            FetchError::Provider(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Decode(err) => Some(err),
            FetchError::Network(_) | FetchError::Auth(_) | FetchError::Provider(_) => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err)
    }
}
