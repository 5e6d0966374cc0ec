mod attachment;
mod conversation;
mod node;
mod selection;
mod sync;

pub use attachment::Attachment;
pub use conversation::Conversation;
pub use node::{ContentPart, MessageNode, Role};
pub use selection::BranchSelections;
pub use sync::{SyncKey, SyncState};
