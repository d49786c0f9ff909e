// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-xy
//!
//! Incremental extractor for the XY retail REST API.
//!
//! Records are pulled page by page from the `_g/{index}` query endpoints,
//! one day window at a time, normalized to snake_case and flattened one
//! level, then written as RECORD lines. A bookmark per stream is checkpointed
//! after every window so an interrupted run resumes where it stopped.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tap_xy::{HttpClient, StateManager, SyncEngine, TapConfig};
//!
//! #[tokio::main]
//! async fn main() -> tap_xy::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let client = HttpClient::with_config(config.http_client_config())?;
//!     let state = StateManager::from_file("state.json")?;
//!
//!     let mut engine = SyncEngine::new(Arc::new(client), Arc::new(state))
//!         .with_config(config.sync_config());
//!
//!     let mut messages = Vec::new();
//!     engine.sync_all(&tap_xy::available_streams(), &mut messages).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          SyncEngine                          │
//! │   streams → WindowPlanner → PagedFetcher → normalize → sink  │
//! └──────────────────────────────────────────────────────────────┘
//!          │                 │                            │
//! ┌────────┴──────┐ ┌────────┴────────┐        ┌──────────┴─────────┐
//! │  StateStore   │ │    Transport    │        │    MessageSink     │
//! │ StateManager  │ │ HttpClient      │        │ JsonLinesSink      │
//! │ (checkpoints) │ │ retry, backoff, │        │ RECORD / STATE     │
//! │               │ │ rate limit      │        │                    │
//! └───────────────┘ └─────────────────┘        └────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Configuration loading
pub mod config;

/// Endpoint template interpolation
pub mod template;

/// Built-in stream definitions
pub mod streams;

/// Catalog-driven stream selection
pub mod catalog;

/// HTTP client with retry and rate limiting
pub mod http;

/// Offset pagination
pub mod pagination;

/// Date window planning
pub mod window;

/// Record key rewriting and denesting
pub mod normalize;

/// State management and checkpointing
pub mod state;

/// Main execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::TapConfig;
pub use engine::{JsonLinesSink, Message, MessageSink, SyncConfig, SyncEngine, SyncStats};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpClientConfig, Transport};
pub use normalize::normalize;
pub use pagination::PagedFetcher;
pub use state::{State, StateManager, StateStore};
pub use streams::{available_streams, StreamDefinition};
pub use types::*;
pub use window::{Window, WindowPlanner};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
