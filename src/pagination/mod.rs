//! Pagination module
//!
//! Offset pagination over the API's `size` / `from` parameters.
//!
//! # Overview
//!
//! - [`PageRequest`] - the parameters of one page
//! - [`PagedFetcher`] - starts a paged read of an endpoint
//! - [`Pages`] - the lazy, single-pass sequence of batches it returns
//!
//! Pagination stops at the first page with zero rows. The advisory `total`
//! field is logged but never used to decide when to stop.

mod fetcher;
mod types;

pub use fetcher::{PagedFetcher, Pages};
pub use types::{FilterParams, PageRequest, FROM_PARAM, QUERY_PATH_PREFIX, SIZE_PARAM};
