//! Message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Display format for message timestamps (e.g. "Jan 1, 2024 00:00").
const TIMESTAMP_FORMAT: &str = "%b %-d, %Y %H:%M";

/// A single message as served by `GET /messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque identifier. Integer ids from the backend are normalised to strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creation time formatted for display.
    pub fn formatted_time(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Accept either `"42"` or `42` for an id.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}
