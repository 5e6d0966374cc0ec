use chatvault_types::Conversation;
use rusqlite::{OptionalExtension, Row, params};

use crate::db::Database;
use crate::error::Result;
use crate::queries::parse_timestamp;

struct ConversationRow {
    id: String,
    provider_id: String,
    title: String,
    current_node_id: Option<String>,
    updated_at: String,
    message_count: i64,
}

fn read_conversation(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        provider_id: row.get(1)?,
        title: row.get(2)?,
        current_node_id: row.get(3)?,
        updated_at: row.get(4)?,
        message_count: row.get(5)?,
    })
}

fn into_conversation(raw: ConversationRow) -> Result<Conversation> {
    let updated_at = parse_timestamp(&raw.updated_at)?;
    Ok(Conversation {
        id: raw.id,
        provider_id: raw.provider_id,
        title: raw.title,
        current_node_id: raw.current_node_id,
        updated_at,
        message_count: raw.message_count as usize,
    })
}

impl Database {
    /// Insert or update a conversation row.
    ///
    /// A pinned leaf already present in the row is kept; sync never
    /// un-pins the viewer's choice.
    pub fn upsert_conversation(&self, conversation: &Conversation) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO conversations (id, provider_id, title, current_node_id, updated_at, message_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                provider_id = excluded.provider_id,
                title = excluded.title,
                current_node_id = COALESCE(current_node_id, excluded.current_node_id),
                updated_at = excluded.updated_at,
                message_count = excluded.message_count
            "#,
            params![
                &conversation.id,
                &conversation.provider_id,
                &conversation.title,
                &conversation.current_node_id,
                conversation.updated_at.to_rfc3339(),
                conversation.message_count as i64,
            ],
        )?;
        Ok(())
    }

    pub fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, provider_id, title, current_node_id, updated_at, message_count \
                 FROM conversations WHERE id = ?1",
                [conversation_id],
                read_conversation,
            )
            .optional()?;
        row.map(into_conversation).transpose()
    }

    pub fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, provider_id, title, current_node_id, updated_at, message_count \
             FROM conversations ORDER BY updated_at DESC",
        )?;
        let rows = stmt
            .query_map([], read_conversation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_conversation).collect()
    }

    /// Viewer op: move (or clear) the pinned leaf. Unlike the sync-side
    /// upsert this does overwrite.
    pub fn set_current_node(&self, conversation_id: &str, node_id: Option<&str>) -> Result<()> {
        self.conn.execute(
            "UPDATE conversations SET current_node_id = ?2 WHERE id = ?1",
            params![conversation_id, node_id],
        )?;
        Ok(())
    }
}
