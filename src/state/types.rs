//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::config::parse_datetime;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Complete state for a tap run
///
/// Serialized as `{"bookmarks": {stream: timestamp}, "currently_syncing": stream|null}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmark, an RFC 3339 timestamp
    #[serde(default, deserialize_with = "deserialize_bookmarks")]
    pub bookmarks: BTreeMap<String, String>,

    /// Stream that was in progress when the state was last written
    #[serde(default)]
    pub currently_syncing: Option<String>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<&str> {
        self.bookmarks.get(stream).map(String::as_str)
    }

    /// Parsed bookmark for a stream
    pub fn bookmark_time(&self, stream: &str) -> Result<Option<DateTime<Utc>>> {
        self.bookmark(stream).map(parse_datetime).transpose()
    }

    /// Set the bookmark for a stream
    pub fn set_bookmark(&mut self, stream: &str, value: DateTime<Utc>) {
        self.bookmarks
            .insert(stream.to_string(), format_bookmark(value));
    }
}

/// A `null` bookmark means the stream has none yet
fn deserialize_bookmarks<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(stream, value)| value.map(|v| (stream, v)))
        .collect())
}

/// Render a bookmark the way it is stored
pub fn format_bookmark(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}
