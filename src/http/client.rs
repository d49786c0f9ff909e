//! HTTP client with retry and rate limiting
//!
//! Provides the HTTP client the fetcher talks to. It handles:
//! - Bearer authentication and the optional User-Agent header
//! - Exponential backoff on server errors, connection failures and the
//!   API's rate-limit status
//! - Optional client-side throttling
//! - Lenient JSON parsing of response bodies

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::transport::Transport;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Method};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Static bearer token
    pub bearer_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Total attempts per request, first try included
    pub max_tries: u32,
    /// Base of the exponential backoff
    pub backoff_factor: u32,
    /// One backoff time unit
    pub backoff_unit: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Status treated as retryable throttling
    pub rate_limit_status: u16,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            timeout: Duration::from_secs(30),
            max_tries: 5,
            backoff_factor: 2,
            backoff_unit: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            rate_limit_status: 429,
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("tap-xy/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the total attempt budget
    pub fn max_tries(mut self, tries: u32) -> Self {
        self.config.max_tries = tries;
        self
    }

    /// Set backoff factor and time unit
    pub fn backoff(mut self, factor: u32, unit: Duration) -> Self {
        self.config.backoff_factor = factor;
        self.config.backoff_unit = unit;
        self
    }

    /// Cap a single backoff delay
    pub fn max_backoff(mut self, max: Duration) -> Self {
        self.config.max_backoff = max;
        self
    }

    /// Set the throttling status code
    pub fn rate_limit_status(mut self, status: u16) -> Self {
        self.config.rate_limit_status = status;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a request and return the response body.
    ///
    /// Only GET is supported; any other method fails before touching the
    /// network. Retryable failures are retried until `max_tries` attempts
    /// have been made, after which the last failure is returned wrapped in
    /// [`Error::RetriesExhausted`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> Result<String> {
        if method != Method::GET {
            return Err(Error::UnsupportedMethod {
                method: method.to_string(),
            });
        }

        let url = self.build_url(path, query)?;
        let max_tries = self.config.max_tries.max(1);
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            attempt += 1;
            debug!(%url, attempt, "GET");

            match self.send_once(&url).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable(self.config.rate_limit_status) => {
                    if attempt >= max_tries {
                        error!(%url, attempt, "Giving up: {err}");
                        return Err(Error::exhausted(attempt, err));
                    }
                    let delay = self.calculate_backoff(attempt - 1);
                    warn!(
                        "Request failed ({err}), attempt {attempt}/{max_tries}, retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Issue a single GET and read its body
    async fn send_once(&self, url: &Url) -> Result<String> {
        let mut req = self.client.get(url.clone());

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(ref token) = self.config.bearer_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        debug!("Received code: {}", status.as_u16());

        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::http_status(status.as_u16(), body))
        }
    }

    /// Build full URL from path and query parameters
    fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)?
        } else {
            let base = self
                .config
                .base_url
                .as_deref()
                .ok_or_else(|| Error::config("HTTP client has no base URL"))?;
            Url::parse(&format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ))?
        };

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Calculate backoff delay before retry number `attempt` (zero based)
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let multiplier = self.config.backoff_factor.saturating_pow(attempt);
        let delay = self.config.backoff_unit.saturating_mul(multiplier);
        std::cmp::min(delay, self.config.max_backoff)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<JsonValue> {
        let body = self.request(Method::GET, path, query).await?;

        // A body that is not JSON is logged and treated as an empty result.
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(path, "Malformed JSON response, treating as empty: {e}");
                Ok(JsonValue::Object(JsonObject::new()))
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("max_tries", &self.config.max_tries)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
