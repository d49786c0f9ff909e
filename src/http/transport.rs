//! Transport seam between the fetcher and the network

use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;

/// Something that can answer a GET with a JSON document.
///
/// [`HttpClient`](super::HttpClient) is the production implementation;
/// it owns retries, so a transport error here is already final.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` with the given query pairs and return the parsed body
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<JsonValue>;
}
