//! Common types used throughout tap-xy
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Records returned by a single page request, in response order
pub type RecordBatch = Vec<JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Replication
// ============================================================================

/// How a stream is replicated on every sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "replication_method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Re-fetch everything on every sync
    FullTable,
    /// Fetch only records changed since the bookmark, day by day
    Incremental {
        /// Record field the API filters on and the bookmark tracks
        bookmark_field: String,
    },
}

impl ReplicationMethod {
    /// Incremental replication keyed on `field`
    pub fn incremental(field: impl Into<String>) -> Self {
        Self::Incremental {
            bookmark_field: field.into(),
        }
    }

    /// The bookmark field, if incremental
    pub fn bookmark_field(&self) -> Option<&str> {
        match self {
            Self::FullTable => None,
            Self::Incremental { bookmark_field } => Some(bookmark_field),
        }
    }

    /// Catalog spelling of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTable => "FULL_TABLE",
            Self::Incremental { .. } => "INCREMENTAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_default() {
        assert_eq!(Method::default(), Method::GET);
        assert_eq!(Method::POST.to_string(), "POST");
    }

    #[test]
    fn test_replication_method_serde() {
        let json = serde_json::to_value(ReplicationMethod::incremental("lastModified")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "replication_method": "INCREMENTAL",
                "bookmark_field": "lastModified"
            })
        );

        let full: ReplicationMethod =
            serde_json::from_str(r#"{"replication_method": "FULL_TABLE"}"#).unwrap();
        assert_eq!(full, ReplicationMethod::FullTable);
        assert_eq!(full.bookmark_field(), None);
        assert_eq!(full.as_str(), "FULL_TABLE");
    }
}
