//! In-memory transport for unit tests

use super::Transport;
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A request as seen by [`FakeTransport`]
#[derive(Debug, Clone)]
pub(crate) struct FakeRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl FakeRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn offset(&self) -> u64 {
        self.param("from").and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

type Handler = dyn Fn(&FakeRequest) -> Result<JsonValue> + Send + Sync;

/// Transport answering from a closure and recording every request
pub(crate) struct FakeTransport {
    handler: Box<Handler>,
    log: Mutex<Vec<FakeRequest>>,
}

impl FakeTransport {
    pub fn new(handler: impl Fn(&FakeRequest) -> Result<JsonValue> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Answers the n-th request with `sizes[n]` rows, and with no rows after that
    pub fn pages(sizes: &[usize]) -> Self {
        let sizes = sizes.to_vec();
        let calls = AtomicUsize::new(0);
        Self::new(move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(rows_body(sizes.get(n).copied().unwrap_or(0), n))
        })
    }

    pub fn requests(&self) -> Vec<FakeRequest> {
        self.log.lock().unwrap().clone()
    }
}

/// `{"rows": [...], "total": n}` with `n` camelCased records
pub(crate) fn rows_body(n: usize, page: usize) -> JsonValue {
    let rows: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "id": format!("p{page}-r{i}"),
                "lastModified": 1_700_000_000_000_i64,
                "store": {"$uri": "commerce/store/1", "storeName": "Main"}
            })
        })
        .collect();
    json!({"rows": rows, "total": n})
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<JsonValue> {
        let request = FakeRequest {
            path: path.to_string(),
            query: query.iter().cloned().collect(),
        };
        self.log.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}
