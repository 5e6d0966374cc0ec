pub mod domain;
pub mod ids;

pub use domain::*;
pub use ids::{attachment_id, node_id};
