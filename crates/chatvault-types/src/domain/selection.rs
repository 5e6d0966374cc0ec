use std::collections::HashMap;

/// Viewer-session branch choices: parent node id -> chosen child id.
///
/// Scoped to one viewer session; not persisted across restarts.
pub type BranchSelections = HashMap<String, String>;
