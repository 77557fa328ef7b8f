//! Library configuration for the discovery engine.
//!
//! [`DiscoveryConfig`] carries everything the providers, cache and service
//! need. The CLI builds one from its config file and flags; library users
//! start from [`DiscoveryConfig::default`].

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::provider::{DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_RESULTS};

/// Default official API base URL.
pub const DEFAULT_OFFICIAL_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default Piped instances, in priority order.
pub const DEFAULT_PIPED_INSTANCES: [&str; 3] = [
    "https://pipedapi.kavin.rocks",
    "https://pipedapi.adminforge.de",
    "https://api.piped.private.coffee",
];

/// Default Invidious instances, in priority order.
pub const DEFAULT_INVIDIOUS_INSTANCES: [&str; 3] = [
    "https://inv.nadeko.net",
    "https://invidious.nerdvpn.de",
    "https://yewtu.be",
];

/// Words appended to a topic to bias searches toward instructional content.
pub const DEFAULT_QUERY_QUALIFIERS: &str = "course lecture tutorial";

/// How long cached results stay fresh.
pub const DEFAULT_FRESH_FOR: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Minimum cached records for a topic to count as fresh.
pub const DEFAULT_MIN_FRESH_RECORDS: usize = 6;

/// Cache freshness policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum age of the newest record.
    pub fresh_for: Duration,
    /// Records required before the cache may answer alone (capped by the
    /// requested limit).
    pub min_fresh_records: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            fresh_for: DEFAULT_FRESH_FOR,
            min_fresh_records: DEFAULT_MIN_FRESH_RECORDS,
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A base URL is not an absolute http(s) URL.
    #[error("invalid {field} URL '{value}': {reason}\n  Suggestion: Use an absolute http(s) URL such as https://example.org")]
    InvalidUrl {
        /// Which setting held the URL.
        field: &'static str,
        /// The offending value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A numeric setting is outside its allowed range.
    #[error("invalid {field}: {reason}")]
    OutOfRange {
        /// Which setting.
        field: &'static str,
        /// What the allowed range is.
        reason: String,
    },
}

/// Complete engine configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Official API credential. The official tier is skipped when absent.
    pub api_key: Option<String>,
    pub official_base_url: String,
    /// Piped instances in priority order.
    pub piped_instances: Vec<String>,
    /// Invidious instances in priority order.
    pub invidious_instances: Vec<String>,
    /// Per-call provider time box.
    pub provider_timeout: Duration,
    /// Aggregate bound over the whole fallback chain.
    pub fallback_deadline: Option<Duration>,
    pub cache_policy: CachePolicy,
    /// Appended to the topic when building the suggestion query.
    pub query_qualifiers: String,
    /// Upper bound for a caller's `max_results`.
    pub max_results_cap: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            official_base_url: DEFAULT_OFFICIAL_BASE_URL.to_string(),
            piped_instances: DEFAULT_PIPED_INSTANCES.map(str::to_string).to_vec(),
            invidious_instances: DEFAULT_INVIDIOUS_INSTANCES.map(str::to_string).to_vec(),
            provider_timeout: DEFAULT_CALL_TIMEOUT,
            fallback_deadline: None,
            cache_policy: CachePolicy::default(),
            query_qualifiers: DEFAULT_QUERY_QUALIFIERS.to_string(),
            max_results_cap: DEFAULT_MAX_RESULTS,
        }
    }
}

impl DiscoveryConfig {
    /// Checks every URL and range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("official_base_url", &self.official_base_url)?;
        for value in &self.piped_instances {
            check_url("piped_instances", value)?;
        }
        for value in &self.invidious_instances {
            check_url("invidious_instances", value)?;
        }
        if self.provider_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "provider_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.fallback_deadline.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::OutOfRange {
                field: "fallback_deadline",
                reason: "must be greater than zero when set".to_string(),
            });
        }
        if self.max_results_cap == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_results_cap",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.cache_policy.fresh_for.is_zero() {
            return Err(ConfigError::OutOfRange {
                field: "cache fresh_for",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// True when the official tier will be used.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl std::fmt::Debug for DiscoveryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("official_base_url", &self.official_base_url)
            .field("piped_instances", &self.piped_instances)
            .field("invidious_instances", &self.invidious_instances)
            .field("provider_timeout", &self.provider_timeout)
            .field("fallback_deadline", &self.fallback_deadline)
            .field("cache_policy", &self.cache_policy)
            .field("query_qualifiers", &self.query_qualifiers)
            .field("max_results_cap", &self.max_results_cap)
            .finish()
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(())
}
