//! State management module
//!
//! Handles bookmark tracking, checkpointing, and resumability.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Bookmarks per stream plus the stream in progress
//! - `StateStore` - The seam the sync engine reads and writes through
//! - `StateManager` - File-backed store with atomic checkpoints

mod manager;
mod types;

pub use manager::{StateManager, StateStore};
pub use types::{format_bookmark, State};

#[cfg(test)]
mod manager_tests;
