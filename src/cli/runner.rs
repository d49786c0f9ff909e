//! CLI runner - executes commands

use crate::catalog::Catalog;
use crate::cli::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::engine::{JsonLinesSink, SyncEngine};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::state::StateManager;
use crate::streams::{available_streams, StreamDefinition};
use serde_json::json;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Sync { streams } => self.sync(streams.as_deref()).await,
            Commands::Streams => self.streams(),
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<TapConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use --config)"))?;
        TapConfig::from_file(path)
    }

    /// Load state
    ///
    /// Input state is never written back; checkpoints go to `--state-out` only.
    fn load_state(&self) -> Result<StateManager> {
        let manager = if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)?
        } else if let Some(path) = &self.cli.state {
            StateManager::load(path)?
        } else {
            StateManager::in_memory()
        };

        Ok(match &self.cli.state_out {
            Some(path) => manager.with_output(path),
            None => manager,
        })
    }

    /// Streams to sync: catalog selection first, then the `--streams` filter
    fn select_streams(&self, filter: Option<&str>) -> Result<Vec<StreamDefinition>> {
        let mut streams = available_streams();

        if let Some(path) = &self.cli.catalog {
            streams = Catalog::from_file(path)?.select(streams);
        }

        let Some(filter) = filter else {
            return Ok(streams);
        };

        let wanted: Vec<&str> = filter
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if wanted.is_empty() {
            return Ok(streams);
        }

        for name in &wanted {
            if !streams.iter().any(|s| s.name == *name) {
                return Err(Error::StreamNotFound {
                    stream: (*name).to_string(),
                });
            }
        }

        Ok(streams
            .into_iter()
            .filter(|s| wanted.contains(&s.name.as_str()))
            .collect())
    }

    /// Sync the selected streams
    async fn sync(&self, filter: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let streams = self.select_streams(filter)?;
        let state = self.load_state()?;

        if streams.is_empty() {
            info!("No streams selected");
            return Ok(());
        }

        let client = HttpClient::with_config(config.http_client_config())?;
        let mut engine = SyncEngine::new(Arc::new(client), Arc::new(state))
            .with_config(config.sync_config());

        let mut sink = JsonLinesSink::new(BufWriter::new(std::io::stdout()));
        let result = engine.sync_all(&streams, &mut sink).await;
        sink.into_inner().flush()?;

        let stats = result?;
        info!(
            streams = stats.streams_synced,
            records = stats.records_synced,
            pages = stats.pages_fetched,
            windows = stats.windows_synced,
            elapsed_ms = stats.duration.as_millis() as u64,
            "Sync complete"
        );
        Ok(())
    }

    /// List the built-in streams
    fn streams(&self) -> Result<()> {
        let streams = available_streams();
        let line = json!({
            "type": "STREAMS",
            "streams": streams,
        });
        println!("{line}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::parse_from(args.iter().copied()))
    }

    #[test]
    fn test_select_all_streams_by_default() {
        let selected = runner(&["tap-xy", "sync"]).select_streams(None).unwrap();
        assert_eq!(selected.len(), 7);
    }

    #[test]
    fn test_select_streams_filter_keeps_definition_order() {
        let selected = runner(&["tap-xy", "sync"])
            .select_streams(Some("item, customer"))
            .unwrap();
        let names: Vec<_> = selected.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["customer", "item"]);
    }

    #[test]
    fn test_select_unknown_stream() {
        let err = runner(&["tap-xy", "sync"])
            .select_streams(Some("orders"))
            .unwrap_err();
        assert!(matches!(err, Error::StreamNotFound { .. }));
    }

    #[test]
    fn test_select_with_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"streams": [{"tap_stream_id": "invoice", "selected": true}]}"#,
        )
        .unwrap();

        let runner = runner(&["tap-xy", "--catalog", path.to_str().unwrap(), "sync"]);
        let names: Vec<_> = runner
            .select_streams(None)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["invoice"]);

        // A stream the catalog did not select cannot be requested
        assert!(runner.select_streams(Some("item")).is_err());
    }

    #[test]
    fn test_missing_config() {
        let err = runner(&["tap-xy", "sync"]).load_config().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_load_state_inline_with_output() {
        use crate::state::StateStore;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");
        let runner = runner(&[
            "tap-xy",
            "--state-json",
            r#"{"currently_syncing": "item"}"#,
            "--state-out",
            out.to_str().unwrap(),
            "sync",
        ]);

        let state = runner.load_state().unwrap();
        assert_eq!(state.path(), Some(out.as_path()));
        assert_eq!(state.currently_syncing().await.as_deref(), Some("item"));
    }

    #[test]
    fn test_load_state_defaults_to_memory() {
        let state = runner(&["tap-xy", "sync"]).load_state().unwrap();
        assert!(state.is_in_memory());
    }
}
