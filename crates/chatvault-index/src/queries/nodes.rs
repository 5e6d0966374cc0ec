use chatvault_types::{Attachment, ContentPart, MessageNode, Role};
use rusqlite::{Row, params};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::queries::parse_timestamp;

const NODE_COLUMNS: &str =
    "id, conversation_id, parent_id, role, content_parts, order_index, provider_node_id, created_at";

struct NodeRow {
    id: String,
    conversation_id: String,
    parent_id: Option<String>,
    role: String,
    content_parts: String,
    order_index: i64,
    provider_node_id: String,
    created_at: String,
}

fn read_node(row: &Row<'_>) -> rusqlite::Result<NodeRow> {
    Ok(NodeRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        parent_id: row.get(2)?,
        role: row.get(3)?,
        content_parts: row.get(4)?,
        order_index: row.get(5)?,
        provider_node_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn into_node(raw: NodeRow) -> Result<MessageNode> {
    let role: Role = raw.role.parse().map_err(Error::Corrupt)?;
    let content_parts: Vec<ContentPart> = serde_json::from_str(&raw.content_parts)
        .map_err(|err| Error::Corrupt(format!("bad content parts for {}: {}", raw.id, err)))?;
    let created_at = parse_timestamp(&raw.created_at)?;

    Ok(MessageNode {
        id: raw.id,
        conversation_id: raw.conversation_id,
        parent_id: raw.parent_id,
        role,
        content_parts,
        order_index: raw.order_index,
        provider_node_id: raw.provider_node_id,
        created_at,
    })
}

impl Database {
    /// All nodes of a conversation, ascending by order_index.
    pub fn get_nodes(&self, conversation_id: &str) -> Result<Vec<MessageNode>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM nodes WHERE conversation_id = ?1 ORDER BY order_index ASC",
            NODE_COLUMNS
        ))?;

        let rows = stmt
            .query_map([conversation_id], read_node)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_node).collect()
    }

    /// The `limit` highest-order_index nodes, returned ascending.
    pub fn nodes_page_recent(&self, conversation_id: &str, limit: usize) -> Result<Vec<MessageNode>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM nodes WHERE conversation_id = ?1 ORDER BY order_index DESC LIMIT ?2",
            NODE_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![conversation_id, limit as i64], read_node)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut nodes = rows.into_iter().map(into_node).collect::<Result<Vec<_>>>()?;
        nodes.reverse();
        Ok(nodes)
    }

    /// Up to `limit` nodes strictly older than the cursor, ascending.
    pub fn nodes_page_before(
        &self,
        conversation_id: &str,
        before_order_index: i64,
        limit: usize,
    ) -> Result<Vec<MessageNode>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM nodes WHERE conversation_id = ?1 AND order_index < ?2 \
             ORDER BY order_index DESC LIMIT ?3",
            NODE_COLUMNS
        ))?;

        let rows = stmt
            .query_map(
                params![conversation_id, before_order_index, limit as i64],
                read_node,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut nodes = rows.into_iter().map(into_node).collect::<Result<Vec<_>>>()?;
        nodes.reverse();
        Ok(nodes)
    }

    pub fn count_nodes(&self, conversation_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE conversation_id = ?1",
            [conversation_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Upsert node and attachment rows in one transaction.
    ///
    /// Existing rows keep their order_index and created_at (assigned once,
    /// never renumbered), and attachments keep a non-null local_path no
    /// matter what the incoming row says. Returns the number of node rows
    /// written.
    pub fn upsert_nodes(
        &self,
        nodes: &[MessageNode],
        attachments: &[Attachment],
    ) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut node_stmt = tx.prepare(
                r#"
                INSERT INTO nodes (id, conversation_id, parent_id, role, content_parts,
                                   order_index, provider_node_id, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(id) DO UPDATE SET
                    parent_id = excluded.parent_id,
                    role = excluded.role,
                    content_parts = excluded.content_parts
                "#,
            )?;
            for node in nodes {
                let content_parts = serde_json::to_string(&node.content_parts)
                    .map_err(|err| Error::Corrupt(format!("unencodable content parts: {}", err)))?;
                changed += node_stmt.execute(params![
                    &node.id,
                    &node.conversation_id,
                    &node.parent_id,
                    node.role.as_str(),
                    &content_parts,
                    node.order_index,
                    &node.provider_node_id,
                    node.created_at.to_rfc3339(),
                ])?;
            }

            let mut attachment_stmt = tx.prepare(
                r#"
                INSERT INTO attachments (id, message_id, file_id, kind, local_path)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    kind = excluded.kind,
                    local_path = COALESCE(local_path, excluded.local_path)
                "#,
            )?;
            for attachment in attachments {
                attachment_stmt.execute(params![
                    &attachment.id,
                    &attachment.message_id,
                    &attachment.file_id,
                    &attachment.kind,
                    &attachment.local_path,
                ])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }
}
