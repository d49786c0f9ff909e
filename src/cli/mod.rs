//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `sync` - Extract records from the selected streams
//! - `streams` - List the built-in streams

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
