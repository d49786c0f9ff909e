//! Catalog input
//!
//! A sync run may be handed a Singer-style catalog that says which streams
//! to extract. Only selection is read from it; schemas are ignored.

use crate::error::{Error, Result, ResultExt};
use crate::streams::StreamDefinition;
use crate::types::JsonValue;
use serde::Deserialize;
use std::path::Path;

/// A parsed catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    /// Catalog entries
    #[serde(default)]
    pub streams: Vec<CatalogEntry>,
}

/// One stream entry in a catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Stream identifier
    #[serde(default)]
    pub tap_stream_id: Option<String>,
    /// Stream name (older catalogs only carry this)
    #[serde(default)]
    pub stream: Option<String>,
    /// Top-level selection flag
    #[serde(default)]
    pub selected: Option<bool>,
    /// Metadata entries with breadcrumbs
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

/// A metadata entry keyed by breadcrumb
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataEntry {
    /// Path to the described element; empty for the stream itself
    #[serde(default)]
    pub breadcrumb: Vec<JsonValue>,
    /// Metadata values
    #[serde(default)]
    pub metadata: JsonValue,
}

impl CatalogEntry {
    /// Stream identifier, preferring `tap_stream_id`
    pub fn name(&self) -> Option<&str> {
        self.tap_stream_id.as_deref().or(self.stream.as_deref())
    }

    /// Whether the entry is selected at the top level or in root metadata
    pub fn is_selected(&self) -> bool {
        if self.selected == Some(true) {
            return true;
        }
        self.metadata
            .iter()
            .filter(|m| m.breadcrumb.is_empty())
            .any(|m| m.metadata.get("selected").and_then(JsonValue::as_bool) == Some(true))
    }
}

impl Catalog {
    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    /// Parse a catalog from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Names of selected streams, in catalog order
    pub fn selected_stream_names(&self) -> Vec<&str> {
        self.streams
            .iter()
            .filter(|e| e.is_selected())
            .filter_map(CatalogEntry::name)
            .collect()
    }

    /// Keep the definitions the catalog selects, preserving definition order
    pub fn select(&self, streams: Vec<StreamDefinition>) -> Vec<StreamDefinition> {
        let selected = self.selected_stream_names();
        streams
            .into_iter()
            .filter(|s| selected.contains(&s.name.as_str()))
            .collect()
    }
}
