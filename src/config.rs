//! Tap configuration
//!
//! The configuration file is a flat JSON (or YAML) object. Known keys are
//! mapped onto [`TapConfig`]; every other top-level key is kept as an
//! endpoint variable and used to fill in the stream endpoint templates
//! (e.g. `"customer": "crm.customer-123"`).

use crate::engine::SyncConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://developer.xyretail.com";

// ============================================================================
// Tap Config
// ============================================================================

/// Runtime configuration for a sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Static bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Lower bound for streams that have no bookmark yet
    #[serde(default, deserialize_with = "deserialize_start_date")]
    pub start_date: Option<DateTime<Utc>>,

    /// Trailing days re-scanned on every incremental sync
    #[serde(default = "default_attribution_window")]
    pub attribution_window: i64,

    /// Optional User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,

    /// API host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Total attempts per request, first try included
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,

    /// Base of the exponential backoff, in seconds
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: u32,

    /// Status code the API uses to signal throttling
    #[serde(default = "default_rate_limit_status")]
    pub rate_limit_status: u16,

    /// Client-side request throttle
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Endpoint identifiers and any other unrecognised keys
    #[serde(flatten)]
    pub endpoints: JsonObject,
}

fn default_attribution_window() -> i64 {
    90
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_tries() -> u32 {
    5
}

fn default_backoff_factor() -> u32 {
    2
}

fn default_rate_limit_status() -> u16 {
    429
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn deserialize_start_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_datetime(&s).map_err(serde::de::Error::custom))
        .transpose()
}

impl TapConfig {
    /// Load configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.token.as_deref().map_or(true, str::is_empty) {
            return Err(Error::missing_field("token"));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        if self.max_tries == 0 {
            return Err(Error::invalid_value("max_tries", "must be at least 1"));
        }
        if self.backoff_factor == 0 {
            return Err(Error::invalid_value("backoff_factor", "must be at least 1"));
        }
        if self.attribution_window < 0 {
            return Err(Error::invalid_value(
                "attribution_window",
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// The bearer token (validated non-empty on load)
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    /// Endpoint variables as strings, for template rendering
    pub fn endpoint_vars(&self) -> HashMap<String, String> {
        self.endpoints
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    JsonValue::String(s) => s.clone(),
                    JsonValue::Number(n) => n.to_string(),
                    JsonValue::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }

    /// HTTP client settings derived from this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .bearer_token(self.token())
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .max_tries(self.max_tries)
            .backoff(self.backoff_factor, Duration::from_secs(1))
            .rate_limit_status(self.rate_limit_status);

        if let Some(agent) = self.user_agent.as_deref().filter(|a| !a.is_empty()) {
            builder = builder.user_agent(agent);
        }

        builder = match self.requests_per_second {
            Some(rps) if rps > 0 => builder.rate_limit(RateLimiterConfig::new(rps, rps)),
            _ => builder.no_rate_limit(),
        };

        builder.build()
    }

    /// Engine settings derived from this config
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new()
            .with_page_size(self.page_size)
            .with_attribution_window_days(self.attribution_window)
            .with_start_date(self.start_date)
            .with_endpoint_vars(self.endpoint_vars())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a datetime string into UTC DateTime
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    // Try RFC 3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try common formats
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d",
    ];

    for fmt in formats {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
        if let Ok(nd) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(DateTime::from_naive_utc_and_offset(
                nd.and_time(chrono::NaiveTime::MIN),
                Utc,
            ));
        }
    }

    Err(Error::config(format!("Invalid datetime format: {s}")))
}
