//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Incremental extractor for the XY retail API
#[derive(Parser, Debug)]
#[command(name = "tap-xy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// State file to resume from (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true, conflicts_with = "state")]
    pub state_json: Option<String>,

    /// Write checkpoints to this file
    #[arg(long, global = true)]
    pub state_out: Option<PathBuf>,

    /// Catalog file selecting which streams to sync
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract records and write RECORD/STATE lines to stdout
    Sync {
        /// Streams to sync (comma-separated, empty = all selected)
        #[arg(long)]
        streams: Option<String>,
    },

    /// List the built-in streams
    Streams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync() {
        let cli = Cli::parse_from([
            "tap-xy",
            "--config",
            "config.json",
            "sync",
            "--streams",
            "item,customer",
            "--state-out",
            "out.json",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("config.json")));
        assert_eq!(cli.state_out, Some(PathBuf::from("out.json")));
        assert!(!cli.verbose);
        match cli.command {
            Commands::Sync { streams } => assert_eq!(streams.as_deref(), Some("item,customer")),
            Commands::Streams => panic!("expected sync"),
        }
    }

    #[test]
    fn test_parse_streams() {
        let cli = Cli::parse_from(["tap-xy", "streams", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Streams));
    }

    #[test]
    fn test_state_and_state_json_conflict() {
        let result = Cli::try_parse_from([
            "tap-xy",
            "--state",
            "s.json",
            "--state-json",
            "{}",
            "sync",
        ]);
        assert!(result.is_err());
    }
}
