//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::State;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage seam for bookmarks and resume information
///
/// Setters only change the in-memory view; nothing is durable until
/// [`StateStore::checkpoint`] returns.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Bookmark for a stream, if one was recorded
    async fn get_bookmark(&self, stream: &str) -> Result<Option<DateTime<Utc>>>;

    /// Record a bookmark for a stream
    async fn set_bookmark(&self, stream: &str, value: DateTime<Utc>) -> Result<()>;

    /// Stream that was in progress when state was last written
    async fn currently_syncing(&self) -> Option<String>;

    /// Set or clear the in-progress stream
    async fn set_currently_syncing(&self, stream: Option<&str>) -> Result<()>;

    /// Persist the current state
    async fn checkpoint(&self) -> Result<()>;

    /// Copy of the current state
    async fn snapshot(&self) -> State;
}

/// State manager for persisting and loading state
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Where checkpoints are written; `None` keeps state in memory only
    path: Option<PathBuf>,
    /// Current state (cached)
    state: Arc<RwLock<State>>,
}

impl StateManager {
    /// Create an empty state manager that checkpoints to `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            state: Arc::new(RwLock::new(State::new())),
        }
    }

    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::with_state(State::new())
    }

    /// Create an in-memory state manager seeded with `state`
    pub fn with_state(state: State) -> Self {
        Self {
            path: None,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Load state from a file and checkpoint back to the same file
    ///
    /// A missing file starts from empty state.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let state = if path.exists() {
            read_state(path)?
        } else {
            State::new()
        };

        Ok(Self::with_state(state).with_output(path))
    }

    /// Load state from a file without writing it back
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(Self::with_state(read_state(path)?))
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;
        Ok(Self::with_state(state))
    }

    /// Write checkpoints to `path`
    #[must_use]
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Save current state to the output file, if there is one
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(()); // In-memory mode
        };

        let contents = self.to_json_pretty().await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to write state file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to rename state file: {e}"),
            })?;

        debug!(path = %path.display(), "State checkpointed");
        Ok(())
    }

    /// Export state as JSON string
    pub async fn to_json(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string(&*state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Export state as pretty-printed JSON string
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Clear all state
    pub async fn clear(&self) {
        *self.state.write().await = State::new();
    }

    /// Get the output file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}

#[async_trait]
impl StateStore for StateManager {
    async fn get_bookmark(&self, stream: &str) -> Result<Option<DateTime<Utc>>> {
        let state = self.state.read().await;
        state.bookmark_time(stream).map_err(|e| Error::State {
            message: format!("Invalid bookmark for stream '{stream}': {e}"),
        })
    }

    async fn set_bookmark(&self, stream: &str, value: DateTime<Utc>) -> Result<()> {
        self.state.write().await.set_bookmark(stream, value);
        Ok(())
    }

    async fn currently_syncing(&self) -> Option<String> {
        self.state.read().await.currently_syncing.clone()
    }

    async fn set_currently_syncing(&self, stream: Option<&str>) -> Result<()> {
        self.state.write().await.currently_syncing = stream.map(ToString::to_string);
        Ok(())
    }

    async fn checkpoint(&self) -> Result<()> {
        self.save().await
    }

    async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }
}

fn read_state(path: &Path) -> Result<State> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
        message: format!("Failed to read state file: {e}"),
    })?;
    serde_json::from_str(&contents).map_err(|e| Error::State {
        message: format!("Failed to parse state file: {e}"),
    })
}
