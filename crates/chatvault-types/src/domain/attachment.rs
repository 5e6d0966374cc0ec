use serde::{Deserialize, Serialize};

/// File attached to a message node.
///
/// `file_id` identifies the remote blob; `local_path` is local-only
/// download state written by the download collaborator. Once set it
/// survives any re-sync of the owning message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub message_id: String,
    pub file_id: String,
    pub kind: String,
    pub local_path: Option<String>,
}
