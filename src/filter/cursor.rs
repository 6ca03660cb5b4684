use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::error::FilterError;

/// Position of the last row on a page, ordered by `(timestamp DESC, id DESC)`.
///
/// Travels to the client as an opaque string and comes back on the next
/// request, so no listing state lives on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub at: DateTime<Utc>,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(at: DateTime<Utc>, id: Uuid) -> Self {
        Self { at, id }
    }

    pub fn encode(&self) -> String {
        format!("{}~{}", self.at.to_rfc3339_opts(SecondsFormat::Micros, true), self.id)
    }

    pub fn decode(raw: &str) -> Result<Self, FilterError> {
        let (at, id) = raw
            .split_once('~')
            .ok_or_else(|| FilterError::InvalidCursor(raw.to_string()))?;
        let at = DateTime::parse_from_rfc3339(at)
            .map_err(|e| FilterError::InvalidCursor(e.to_string()))?
            .with_timezone(&Utc);
        let id = Uuid::parse_str(id).map_err(|e| FilterError::InvalidCursor(e.to_string()))?;
        Ok(Self { at, id })
    }
}
