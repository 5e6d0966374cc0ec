mod attachments;
mod conversations;
mod nodes;
mod sync_state;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| Error::Corrupt(format!("bad timestamp '{}': {}", raw, err)))
}
