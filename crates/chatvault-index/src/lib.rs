// SQLite archive store
// One database per vault; the runtime layer adapts this to the
// ConversationStore contract.

mod db;
mod error;
mod queries;
mod schema;

pub use db::Database;
pub use error::{Error, Result};
