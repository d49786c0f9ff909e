//! Paged fetcher
//!
//! [`PagedFetcher::fetch`] returns a [`Pages`] sequence. Each call to
//! [`Pages::next`] issues exactly one request. The sequence ends after the
//! first empty page, which is itself yielded so callers can observe the end
//! of the endpoint.

use super::types::{FilterParams, PageRequest};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::{JsonValue, RecordBatch};
use futures::Stream;
use tracing::debug;

/// Field of the response body holding the page's records
const ROWS_FIELD: &str = "rows";

/// Field of the response body holding the advisory total
const TOTAL_FIELD: &str = "total";

/// Issues paginated GETs against one transport
#[derive(Clone, Copy)]
pub struct PagedFetcher<'a> {
    transport: &'a dyn Transport,
    page_size: u32,
}

impl<'a> PagedFetcher<'a> {
    /// Create a fetcher requesting `page_size` rows per page
    pub fn new(transport: &'a dyn Transport, page_size: u32) -> Self {
        Self {
            transport,
            page_size,
        }
    }

    /// Rows requested per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Start paging through `endpoint`. Nothing is requested until the
    /// first call to [`Pages::next`].
    pub fn fetch(&self, endpoint: &str, filters: FilterParams) -> Pages<'a> {
        Pages {
            transport: self.transport,
            request: PageRequest::new(endpoint, self.page_size, filters),
            finished: false,
            pages_fetched: 0,
        }
    }
}

/// Lazy, single-pass sequence of page batches.
///
/// Once the terminating empty batch has been returned, or a request has
/// failed, every further call to [`next`](Self::next) returns `Ok(None)`
/// without touching the network. There is no way to rewind.
pub struct Pages<'a> {
    transport: &'a dyn Transport,
    request: PageRequest,
    finished: bool,
    pages_fetched: usize,
}

impl<'a> Pages<'a> {
    /// Fetch the next page
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Result<Option<RecordBatch>> {
        if self.finished {
            return Ok(None);
        }

        let body = match self
            .transport
            .get_json(&self.request.path(), &self.request.query())
            .await
        {
            Ok(body) => body,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        let offset = self.request.offset;
        self.pages_fetched += 1;
        self.request.advance();

        let total = body.get(TOTAL_FIELD).and_then(JsonValue::as_u64);
        let batch = extract_rows(body);
        debug!(
            endpoint = %self.request.endpoint,
            offset,
            rows = batch.len(),
            total,
            "Fetched page"
        );

        if batch.is_empty() {
            self.finished = true;
        }

        Ok(Some(batch))
    }

    /// Whether the sequence has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of successful requests so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// The request the next call will issue
    pub fn next_request(&self) -> &PageRequest {
        &self.request
    }

    /// Adapt into a `futures::Stream` of batches
    pub fn into_stream(self) -> impl Stream<Item = Result<RecordBatch>> + 'a {
        futures::stream::try_unfold(self, |mut pages| async move {
            Ok::<_, Error>(pages.next().await?.map(|batch| (batch, pages)))
        })
    }
}

/// Take the `rows` array out of a response body; anything else is empty
fn extract_rows(body: JsonValue) -> RecordBatch {
    match body {
        JsonValue::Object(mut map) => match map.remove(ROWS_FIELD) {
            Some(JsonValue::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
