//! Engine types
//!
//! Message types, output sinks and configuration for the sync engine.

use crate::error::Result;
use crate::state::State;
use crate::types::JsonValue;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

/// A message emitted during sync
///
/// Serialized as one JSON object per line with an upper-case `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// A normalized record
    Record {
        /// Stream name
        stream: String,
        /// The record
        record: JsonValue,
        /// When the record was fetched
        time_extracted: DateTime<Utc>,
    },
    /// Snapshot of the state after a checkpoint
    State {
        /// Full state
        value: State,
    },
}

impl Message {
    /// Create a record message
    pub fn record(
        stream: impl Into<String>,
        record: JsonValue,
        time_extracted: DateTime<Utc>,
    ) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted,
        }
    }

    /// Create a state message
    pub fn state(value: State) -> Self {
        Self::State { value }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}

/// Destination for emitted messages
pub trait MessageSink: Send {
    /// Emit one message
    fn emit(&mut self, message: Message) -> Result<()>;
}

impl MessageSink for Vec<Message> {
    fn emit(&mut self, message: Message) -> Result<()> {
        self.push(message);
        Ok(())
    }
}

/// Writes each message as a JSON line
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> MessageSink for JsonLinesSink<W> {
    fn emit(&mut self, message: Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        // STATE lines must be durable before the next window starts
        if message.is_state() {
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Records requested per page, unless the stream overrides it
    pub page_size: u32,
    /// Trailing days always re-scanned
    pub attribution_window_days: i64,
    /// Bookmark used for streams that have none
    pub start_date: Option<DateTime<Utc>>,
    /// Length of each date window
    pub window_size: TimeDelta,
    /// Values for endpoint templates
    pub endpoint_vars: HashMap<String, String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            attribution_window_days: 90,
            start_date: None,
            window_size: TimeDelta::days(1),
            endpoint_vars: HashMap::new(),
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Set attribution window
    #[must_use]
    pub fn with_attribution_window_days(mut self, days: i64) -> Self {
        self.attribution_window_days = days;
        self
    }

    /// Set start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: Option<DateTime<Utc>>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Set window size
    #[must_use]
    pub fn with_window_size(mut self, size: TimeDelta) -> Self {
        self.window_size = size;
        self
    }

    /// Replace all endpoint variables
    #[must_use]
    pub fn with_endpoint_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.endpoint_vars = vars;
        self
    }

    /// Add one endpoint variable
    #[must_use]
    pub fn with_endpoint_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.endpoint_vars.insert(key.into(), value.into());
        self
    }

    /// Bookmark used when state has none
    pub fn default_bookmark(&self) -> DateTime<Utc> {
        self.start_date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total records emitted
    pub records_synced: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Total windows drained
    pub windows_synced: usize,
    /// Total streams completed
    pub streams_synced: usize,
    /// Wall time spent syncing
    pub duration: Duration,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a window
    pub fn add_window(&mut self) {
        self.windows_synced += 1;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Fold another run's counters into these
    pub fn merge(&mut self, other: &SyncStats) {
        self.records_synced += other.records_synced;
        self.pages_fetched += other.pages_fetched;
        self.windows_synced += other.windows_synced;
        self.streams_synced += other.streams_synced;
        self.duration += other.duration;
    }
}
