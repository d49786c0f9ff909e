//! Pagination types
//!
//! The API pages with `size` / `from` query parameters. A [`PageRequest`]
//! carries everything needed to issue the next request and is advanced by
//! one page size after every response.

use std::collections::BTreeMap;

/// Extra query parameters sent with every page, e.g. date filters
pub type FilterParams = BTreeMap<String, String>;

/// Query parameter carrying the page size
pub const SIZE_PARAM: &str = "size";

/// Query parameter carrying the row offset
pub const FROM_PARAM: &str = "from";

/// Path prefix of the API's query endpoints
pub const QUERY_PATH_PREFIX: &str = "_g";

/// Parameters of one page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Resolved endpoint (index name)
    pub endpoint: String,
    /// Row offset of this page
    pub offset: u64,
    /// Rows per page
    pub page_size: u32,
    /// Extra filter parameters
    pub filters: FilterParams,
}

impl PageRequest {
    /// First page of `endpoint`
    pub fn new(endpoint: impl Into<String>, page_size: u32, filters: FilterParams) -> Self {
        Self {
            endpoint: endpoint.into(),
            offset: 0,
            page_size,
            filters,
        }
    }

    /// Request path relative to the API base URL
    pub fn path(&self) -> String {
        format!("{QUERY_PATH_PREFIX}/{}", self.endpoint)
    }

    /// Query pairs: `size` and `from`, overlaid with the filters
    pub fn query(&self) -> Vec<(String, String)> {
        let mut params = BTreeMap::new();
        params.insert(SIZE_PARAM.to_string(), self.page_size.to_string());
        params.insert(FROM_PARAM.to_string(), self.offset.to_string());
        params.extend(self.filters.clone());
        params.into_iter().collect()
    }

    /// Move to the next page.
    ///
    /// The offset always steps by the page size, whatever the last page held.
    pub fn advance(&mut self) {
        self.offset += u64::from(self.page_size);
    }
}
