//! Stream definitions
//!
//! Every entity the API exposes is described by one [`StreamDefinition`].
//! The built-in table mirrors the XY retail indices; the endpoint of each
//! stream is an index name that differs per tenant, so it is a template
//! filled from the configuration.

use crate::error::{Error, Result};
use crate::template;
use crate::types::ReplicationMethod;
use serde::Serialize;
use std::collections::HashMap;

/// Field every built-in stream is bookmarked on
pub const LAST_MODIFIED: &str = "lastModified";

/// Immutable description of one stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDefinition {
    /// Stream name, also the bookmark key
    pub name: String,
    /// Endpoint template, e.g. `commerce.item-{item}`
    pub endpoint: String,
    /// Natural key fields, for documentation only
    pub key_properties: Vec<String>,
    /// Replication strategy
    #[serde(flatten)]
    pub replication: ReplicationMethod,
    /// Page size override; the engine default applies when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl StreamDefinition {
    /// Create an incremental stream keyed on `id` and bookmarked on `bookmark_field`
    pub fn incremental(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        bookmark_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            key_properties: vec!["id".to_string()],
            replication: ReplicationMethod::incremental(bookmark_field),
            page_size: None,
        }
    }

    /// Create a full-table stream keyed on `id`
    pub fn full_table(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            key_properties: vec!["id".to_string()],
            replication: ReplicationMethod::FullTable,
            page_size: None,
        }
    }

    /// Override the key fields
    #[must_use]
    pub fn with_key_properties(mut self, keys: &[&str]) -> Self {
        self.key_properties = keys.iter().map(|k| (*k).to_string()).collect();
        self
    }

    /// Override the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Resolve the endpoint template against configuration values
    pub fn resolve_endpoint(&self, vars: &HashMap<String, String>) -> Result<String> {
        template::render(&self.endpoint, vars)
    }

    /// Configuration keys this stream's endpoint needs
    pub fn required_vars(&self) -> Vec<String> {
        template::placeholders(&self.endpoint)
    }

    /// Whether this stream is synced incrementally
    pub fn is_incremental(&self) -> bool {
        matches!(self.replication, ReplicationMethod::Incremental { .. })
    }
}

/// The streams this tap knows about, in sync order
pub fn available_streams() -> Vec<StreamDefinition> {
    vec![
        StreamDefinition::incremental(
            "sales_order_line",
            "commerce.salesorderline-{sales_order_line}",
            LAST_MODIFIED,
        ),
        StreamDefinition::incremental("customer", "{customer}", LAST_MODIFIED),
        StreamDefinition::incremental("inventory", "commerce.inventory-{inventory}", LAST_MODIFIED),
        StreamDefinition::incremental("invoice", "{invoice}", LAST_MODIFIED),
        StreamDefinition::incremental(
            "inventory_movement",
            "{inventory_movement}",
            LAST_MODIFIED,
        ),
        StreamDefinition::incremental("item", "commerce.item-{item}", LAST_MODIFIED),
        StreamDefinition::incremental(
            "stock_transfer",
            "commerce.stocktransferline-{stock_transfer}",
            LAST_MODIFIED,
        ),
    ]
}

/// Look up a built-in stream by name
pub fn find_stream(name: &str) -> Result<StreamDefinition> {
    available_streams()
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_streams() {
        let streams = available_streams();
        let names: Vec<_> = streams.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "sales_order_line",
                "customer",
                "inventory",
                "invoice",
                "inventory_movement",
                "item",
                "stock_transfer"
            ]
        );
        for stream in &streams {
            assert!(stream.is_incremental());
            assert_eq!(stream.replication.bookmark_field(), Some(LAST_MODIFIED));
            assert_eq!(stream.key_properties, vec!["id"]);
            assert_eq!(stream.required_vars(), vec![stream.name.clone()]);
        }
    }

    #[test]
    fn test_resolve_endpoint() {
        let stream = find_stream("stock_transfer").unwrap();
        let vars = HashMap::from([("stock_transfer".to_string(), "acme".to_string())]);
        assert_eq!(
            stream.resolve_endpoint(&vars).unwrap(),
            "commerce.stocktransferline-acme"
        );

        let err = stream.resolve_endpoint(&HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { .. }));
    }

    #[test]
    fn test_find_unknown_stream() {
        assert!(matches!(
            find_stream("orders"),
            Err(Error::StreamNotFound { .. })
        ));
    }

    #[test]
    fn test_full_table_definition() {
        let stream = StreamDefinition::full_table("store", "commerce.store-{store}")
            .with_key_properties(&["store_id"])
            .with_page_size(25);
        assert!(!stream.is_incremental());
        assert_eq!(stream.replication.bookmark_field(), None);
        assert_eq!(stream.page_size, Some(25));

        let json = serde_json::to_value(&stream).unwrap();
        assert_eq!(json["replication_method"], "FULL_TABLE");
        assert_eq!(json["key_properties"], serde_json::json!(["store_id"]));
    }
}
