use chatvault_types::SyncState;
use rusqlite::{OptionalExtension, Row, params};

use crate::db::Database;
use crate::error::Result;
use crate::queries::parse_timestamp;

struct SyncStateRow {
    provider_id: String,
    conversation_id: String,
    last_sync_at: Option<String>,
    is_syncing: bool,
}

fn read_sync_state(row: &Row<'_>) -> rusqlite::Result<SyncStateRow> {
    Ok(SyncStateRow {
        provider_id: row.get(0)?,
        conversation_id: row.get(1)?,
        last_sync_at: row.get(2)?,
        is_syncing: row.get(3)?,
    })
}

fn into_sync_state(raw: SyncStateRow) -> Result<SyncState> {
    let last_sync_at = raw
        .last_sync_at
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    Ok(SyncState {
        provider_id: raw.provider_id,
        conversation_id: raw.conversation_id,
        last_sync_at,
        is_syncing: raw.is_syncing,
    })
}

impl Database {
    pub fn get_sync_state(
        &self,
        provider_id: &str,
        conversation_id: &str,
    ) -> Result<Option<SyncState>> {
        let row = self
            .conn
            .query_row(
                "SELECT provider_id, conversation_id, last_sync_at, is_syncing \
                 FROM sync_state WHERE provider_id = ?1 AND conversation_id = ?2",
                [provider_id, conversation_id],
                read_sync_state,
            )
            .optional()?;
        row.map(into_sync_state).transpose()
    }

    pub fn set_sync_state(&self, state: &SyncState) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO sync_state (provider_id, conversation_id, last_sync_at, is_syncing)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(provider_id, conversation_id) DO UPDATE SET
                last_sync_at = excluded.last_sync_at,
                is_syncing = excluded.is_syncing
            "#,
            params![
                &state.provider_id,
                &state.conversation_id,
                state.last_sync_at.map(|ts| ts.to_rfc3339()),
                state.is_syncing,
            ],
        )?;
        Ok(())
    }
}
