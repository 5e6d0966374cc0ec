use chatvault_types::Attachment;
use rusqlite::{OptionalExtension, Row, params};

use crate::db::Database;
use crate::error::Result;

fn read_attachment(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        message_id: row.get(1)?,
        file_id: row.get(2)?,
        kind: row.get(3)?,
        local_path: row.get(4)?,
    })
}

impl Database {
    pub fn get_attachment(&self, attachment_id: &str) -> Result<Option<Attachment>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, message_id, file_id, kind, local_path \
                 FROM attachments WHERE id = ?1",
                [attachment_id],
                read_attachment,
            )
            .optional()?;
        Ok(row)
    }

    pub fn attachments_for_message(&self, message_id: &str) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, message_id, file_id, kind, local_path \
             FROM attachments WHERE message_id = ?1 ORDER BY file_id",
        )?;
        let rows = stmt
            .query_map([message_id], read_attachment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// All attachment rows in a conversation, joined through their nodes.
    pub fn attachments_for_conversation(&self, conversation_id: &str) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.message_id, a.file_id, a.kind, a.local_path \
             FROM attachments a JOIN nodes n ON n.id = a.message_id \
             WHERE n.conversation_id = ?1 ORDER BY a.id",
        )?;
        let rows = stmt
            .query_map([conversation_id], read_attachment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Download collaborator op: record where the blob landed locally.
    pub fn set_attachment_local_path(&self, attachment_id: &str, path: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE attachments SET local_path = ?2 WHERE id = ?1",
            params![attachment_id, path],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatvault_types::{ContentPart, MessageNode, Role};
    use chrono::{TimeZone, Utc};

    fn seed_node(db: &Database) {
        let node = MessageNode {
            id: "n0".to_string(),
            conversation_id: "c1".to_string(),
            parent_id: None,
            role: Role::User,
            content_parts: vec![ContentPart::text("hi")],
            order_index: 0,
            provider_node_id: "p-n0".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
        };
        db.upsert_nodes(std::slice::from_ref(&node), &[]).unwrap();
    }

    fn attachment(id: &str, file_id: &str) -> Attachment {
        Attachment {
            id: id.to_string(),
            message_id: "n0".to_string(),
            file_id: file_id.to_string(),
            kind: "image".to_string(),
            local_path: None,
        }
    }

    #[test]
    fn attachment_lookup_by_message_and_conversation() {
        let db = Database::open_in_memory().unwrap();
        seed_node(&db);
        db.upsert_nodes(&[], &[attachment("a1", "f1"), attachment("a2", "f2")])
            .unwrap();

        assert_eq!(db.attachments_for_message("n0").unwrap().len(), 2);
        assert_eq!(db.attachments_for_conversation("c1").unwrap().len(), 2);
        assert_eq!(db.attachments_for_conversation("other").unwrap().len(), 0);
        assert!(db.get_attachment("a1").unwrap().is_some());
    }

    #[test]
    fn local_path_set_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        seed_node(&db);
        db.upsert_nodes(&[], &[attachment("a1", "f1")]).unwrap();

        db.set_attachment_local_path("a1", "/vault/f1.bin").unwrap();
        let stored = db.get_attachment("a1").unwrap().unwrap();
        assert_eq!(stored.local_path.as_deref(), Some("/vault/f1.bin"));
    }
}
