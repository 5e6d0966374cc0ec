// Schema notes:
// - Node identity is the local id (deterministic per provider node); the
//   (conversation_id, provider_node_id) unique index is the dedup key the
//   sync diff relies on.
// - order_index is assigned once at insert and never rewritten, so the
//   (conversation_id, order_index) index serves keyset pagination.
// - attachments.local_path is local-only state; node upserts go out of
//   their way (COALESCE) to never null it out.

pub const SCHEMA: &str = r#"
-- The store upserts nodes before their parent conversation row (see the
-- sync path), so referential enforcement is left at SQLite's documented
-- default of OFF. The bundled build flips that default to ON, so it is
-- set back explicitly here; the FOREIGN KEY clauses below stay as schema
-- documentation of the intended shape.
PRAGMA foreign_keys = OFF;

CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    provider_id TEXT NOT NULL,
    title TEXT NOT NULL,
    current_node_id TEXT,
    updated_at TEXT NOT NULL,
    message_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL,
    parent_id TEXT,
    role TEXT NOT NULL,
    content_parts TEXT NOT NULL,
    order_index INTEGER NOT NULL,
    provider_node_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (conversation_id, provider_node_id),
    FOREIGN KEY (conversation_id) REFERENCES conversations(id)
);

CREATE TABLE IF NOT EXISTS attachments (
    id TEXT PRIMARY KEY,
    message_id TEXT NOT NULL,
    file_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    local_path TEXT,
    FOREIGN KEY (message_id) REFERENCES nodes(id)
);

CREATE TABLE IF NOT EXISTS sync_state (
    provider_id TEXT NOT NULL,
    conversation_id TEXT NOT NULL,
    last_sync_at TEXT,
    is_syncing BOOLEAN NOT NULL DEFAULT 0,
    PRIMARY KEY (provider_id, conversation_id)
);

CREATE INDEX IF NOT EXISTS idx_nodes_conversation_order ON nodes(conversation_id, order_index);
CREATE INDEX IF NOT EXISTS idx_attachments_message ON attachments(message_id);
"#;
