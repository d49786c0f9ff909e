//! HTTP client module
//!
//! Provides the HTTP client with retry, backoff and rate limiting.
//!
//! # Features
//!
//! - **Automatic Retries**: exponential backoff on 5xx, connection
//!   failures and the configured rate-limit status
//! - **Rate Limiting**: optional token bucket limiter using governor
//! - **Transport trait**: the seam the paginated fetcher is written against

mod client;
mod rate_limit;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::Transport;

#[cfg(test)]
pub(crate) mod fake;
