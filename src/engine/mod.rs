//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Walks streams through windows and pages, emitting records
//! - `SyncConfig` - Configuration for sync operations
//! - `Message` / `MessageSink` - Output of a sync (RECORD and STATE lines)

mod types;

pub use types::{JsonLinesSink, Message, MessageSink, SyncConfig, SyncStats};

use crate::error::Result;
use crate::http::Transport;
use crate::normalize::normalize;
use crate::pagination::{FilterParams, PagedFetcher};
use crate::state::StateStore;
use crate::streams::StreamDefinition;
use crate::types::ReplicationMethod;
use crate::window::WindowPlanner;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// Page source
    transport: Arc<dyn Transport>,
    /// Bookmark storage
    state: Arc<dyn StateStore>,
    /// Sync configuration
    config: SyncConfig,
    /// Current time
    clock: Clock,
    /// Statistics
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(transport: Arc<dyn Transport>, state: Arc<dyn StateStore>) -> Self {
        Self {
            transport,
            state,
            config: SyncConfig::default(),
            clock: Arc::new(Utc::now),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Get the sync configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get the state store
    pub fn state(&self) -> &Arc<dyn StateStore> {
        &self.state
    }

    /// Statistics accumulated over every sync this engine ran
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Sync one stream to completion
    ///
    /// Incremental streams are fetched window by window and checkpointed after
    /// each window; full-table streams are fetched in one unfiltered pass. On
    /// error the stream is abandoned, keeping whatever was already checkpointed.
    pub async fn sync_stream(
        &mut self,
        stream: &StreamDefinition,
        sink: &mut dyn MessageSink,
    ) -> Result<SyncStats> {
        let started = Instant::now();
        let now = self.now();
        let endpoint = stream.resolve_endpoint(&self.config.endpoint_vars)?;
        let page_size = stream.page_size.unwrap_or(self.config.page_size);
        let transport = Arc::clone(&self.transport);
        let fetcher = PagedFetcher::new(transport.as_ref(), page_size);
        let mut stats = SyncStats::new();

        info!(
            stream = %stream.name,
            endpoint = %endpoint,
            replication = stream.replication.as_str(),
            "Starting sync"
        );

        match &stream.replication {
            ReplicationMethod::FullTable => {
                self.drain(&fetcher, stream, &endpoint, FilterParams::new(), sink, &mut stats)
                    .await?;
                self.state.set_bookmark(&stream.name, now).await?;
            }
            ReplicationMethod::Incremental { bookmark_field } => {
                let previous = match self.state.get_bookmark(&stream.name).await? {
                    Some(bookmark) => bookmark,
                    None => self.config.default_bookmark(),
                };
                let planner = WindowPlanner::new(self.config.attribution_window_days)
                    .with_window_size(self.config.window_size);
                let windows = planner.plan(previous, now);
                debug!(
                    stream = %stream.name,
                    bookmark = %previous,
                    from = %windows.start(),
                    to = %windows.end(),
                    "Planned windows"
                );

                let mut bookmark = previous;
                for window in windows {
                    let filters = window.filter_params(bookmark_field);
                    self.drain(&fetcher, stream, &endpoint, filters, sink, &mut stats)
                        .await?;
                    stats.add_window();

                    bookmark = bookmark.max(window.end.min(now));
                    self.state.set_bookmark(&stream.name, bookmark).await?;
                    self.checkpoint(sink).await?;
                    debug!(stream = %stream.name, window_start = %window.start, "Window done");
                }

                self.state
                    .set_bookmark(&stream.name, bookmark.max(now))
                    .await?;
            }
        }

        self.checkpoint(sink).await?;

        stats.add_stream();
        stats.duration = started.elapsed();
        self.stats.merge(&stats);

        info!(
            stream = %stream.name,
            records = stats.records_synced,
            pages = stats.pages_fetched,
            windows = stats.windows_synced,
            elapsed_ms = stats.duration.as_millis() as u64,
            "Completed sync"
        );

        Ok(stats)
    }

    /// Sync streams one after another
    ///
    /// A run interrupted mid-stream resumes at that stream and wraps around to
    /// the ones before it.
    pub async fn sync_all(
        &mut self,
        streams: &[StreamDefinition],
        sink: &mut dyn MessageSink,
    ) -> Result<SyncStats> {
        let started = Instant::now();
        let resume_from = self.state.currently_syncing().await;
        let order = resume_order(streams, resume_from.as_deref());
        let mut total = SyncStats::new();

        for stream in order {
            self.state.set_currently_syncing(Some(&stream.name)).await?;
            self.checkpoint(sink).await?;

            match self.sync_stream(stream, sink).await {
                Ok(stats) => total.merge(&stats),
                Err(e) => {
                    error!(stream = %stream.name, error = %e, "Stream sync failed");
                    return Err(e);
                }
            }
        }

        self.state.set_currently_syncing(None).await?;
        self.checkpoint(sink).await?;

        total.duration = started.elapsed();
        info!(
            streams = total.streams_synced,
            records = total.records_synced,
            "Sync finished"
        );
        Ok(total)
    }

    /// Fetch every page for one filter set and emit normalized records
    async fn drain(
        &self,
        fetcher: &PagedFetcher<'_>,
        stream: &StreamDefinition,
        endpoint: &str,
        filters: FilterParams,
        sink: &mut dyn MessageSink,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let mut pages = fetcher.fetch(endpoint, filters);

        while let Some(batch) = pages.next().await? {
            stats.add_page();
            let extracted = self.now();
            let count = batch.len();

            for record in batch {
                sink.emit(Message::record(
                    stream.name.as_str(),
                    normalize(record),
                    extracted,
                ))?;
            }
            stats.add_records(count);
        }

        Ok(())
    }

    /// Persist state, then announce it
    async fn checkpoint(&self, sink: &mut dyn MessageSink) -> Result<()> {
        self.state.checkpoint().await?;
        sink.emit(Message::state(self.state.snapshot().await))
    }
}

/// Rotate `streams` so iteration starts at `current`
fn resume_order<'a>(
    streams: &'a [StreamDefinition],
    current: Option<&str>,
) -> Vec<&'a StreamDefinition> {
    let Some(current) = current else {
        return streams.iter().collect();
    };

    match streams.iter().position(|s| s.name == current) {
        Some(index) => {
            info!(stream = current, "Resuming interrupted sync");
            streams[index..].iter().chain(&streams[..index]).collect()
        }
        None => {
            warn!(stream = current, "Interrupted stream is not selected; starting over");
            streams.iter().collect()
        }
    }
}
