//! Video search providers and the tiered fallback chain.
//!
//! Three tiers of backend front the same video platform: a quota-limited
//! official API and two families of unofficial public mirrors. Each backend
//! endpoint is one [`VideoProvider`]; the [`FallbackOrchestrator`] tries them
//! in tier order until one yields videos.
//!
//! # Architecture
//!
//! - [`VideoProvider`] - Async trait every backend implements
//! - [`FallbackOrchestrator`] - Tier-ordered provider list with the fallback loop
//! - [`OfficialApiProvider`] - Official API (search + duration lookup), needs a key
//! - [`PipedProvider`] - One Piped mirror instance
//! - [`InvidiousProvider`] - One Invidious mirror instance
//! - [`normalize`] - Per-tier raw entry to [`crate::video::VideoItem`] mapping
//!
//! # Example
//!
//! ```no_run
//! use discovery_core::config::DiscoveryConfig;
//! use discovery_core::provider::{SearchOptions, build_default_orchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = build_default_orchestrator(&DiscoveryConfig::default());
//! let hit = orchestrator
//!     .search("rust ownership course", &SearchOptions::default())
//!     .await?;
//! println!("{} videos from {}", hit.videos.len(), hit.provider);
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod invidious;
pub mod normalize;
mod official;
mod orchestrator;
mod piped;

pub use error::{NormalizeError, ProviderError};
pub use http_client::{DEFAULT_CALL_TIMEOUT, build_provider_http_client, upstream_error};
pub use invidious::InvidiousProvider;
pub use official::OfficialApiProvider;
pub use orchestrator::{FallbackOrchestrator, ProviderHit};
pub use piped::PipedProvider;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DiscoveryConfig;
use crate::video::VideoItem;

/// Upper bound on results any single search returns.
pub const DEFAULT_MAX_RESULTS: usize = 25;

/// Builds the orchestrator described by `config`.
///
/// The official tier is registered only when a non-blank credential is
/// configured. Mirrors keep their configured order within each family. A
/// provider whose client cannot be built is skipped with a warning.
#[must_use]
pub fn build_default_orchestrator(config: &DiscoveryConfig) -> FallbackOrchestrator {
    let mut orchestrator = FallbackOrchestrator::new().with_deadline(config.fallback_deadline);
    let timeout = config.provider_timeout;

    if let Some(api_key) = config.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
        match OfficialApiProvider::with_base_url(api_key, &config.official_base_url, timeout) {
            Ok(provider) => orchestrator.register(Box::new(provider)),
            Err(error) => warn!(
                error = %error,
                "Official API provider unavailable; continuing with mirrors"
            ),
        }
    }

    for base_url in &config.piped_instances {
        match PipedProvider::new(base_url, timeout) {
            Ok(provider) => orchestrator.register(Box::new(provider)),
            Err(error) => warn!(error = %error, base_url, "Skipping Piped mirror"),
        }
    }

    for base_url in &config.invidious_instances {
        match InvidiousProvider::new(base_url, timeout) {
            Ok(provider) => orchestrator.register(Box::new(provider)),
            Err(error) => warn!(error = %error, base_url, "Skipping Invidious mirror"),
        }
    }

    orchestrator
}

/// Priority class of a search backend.
///
/// Derives `Ord` so that `Official < Piped < Invidious` for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTier {
    /// Official, credentialed, quota-limited API.
    Official = 0,
    /// Mirror family A.
    Piped = 1,
    /// Mirror family B.
    Invidious = 2,
}

impl ProviderTier {
    /// Returns the label stored as a cache record's `source`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Official => "official",
            Self::Piped => "piped",
            Self::Invidious => "invidious",
        }
    }
}

impl fmt::Display for ProviderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "official" => Ok(Self::Official),
            "piped" => Ok(Self::Piped),
            "invidious" => Ok(Self::Invidious),
            _ => Err(format!("invalid provider tier: {s}")),
        }
    }
}

/// Result ordering requested from providers that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Date,
    ViewCount,
    Rating,
}

impl SearchOrder {
    /// Official API `order` value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
            Self::ViewCount => "viewCount",
            Self::Rating => "rating",
        }
    }

    /// Invidious `sort_by` value.
    #[must_use]
    pub fn invidious_sort(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "upload_date",
            Self::ViewCount => "view_count",
            Self::Rating => "rating",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SearchOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "date" => Ok(Self::Date),
            "viewcount" | "view_count" => Ok(Self::ViewCount),
            "rating" => Ok(Self::Rating),
            _ => Err(format!(
                "invalid order '{s}' (expected relevance, date, viewCount or rating)"
            )),
        }
    }
}

/// Video length bucket filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    #[default]
    Any,
    Short,
    Medium,
    Long,
}

impl DurationBucket {
    /// Parameter value shared by the official API and Invidious.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DurationBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(format!(
                "invalid duration '{s}' (expected any, short, medium or long)"
            )),
        }
    }
}

/// Per-call search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum videos a provider returns.
    pub max_results: usize,
    /// Restrict to one channel (official tier only).
    pub channel_id: Option<String>,
    pub order: SearchOrder,
    pub duration: DurationBucket,
}

impl SearchOptions {
    /// Options with only a result limit set.
    #[must_use]
    pub fn with_max_results(max_results: usize) -> Self {
        Self {
            max_results,
            ..Self::default()
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            channel_id: None,
            order: SearchOrder::default(),
            duration: DurationBucket::default(),
        }
    }
}

/// Trait every search backend implements.
///
/// # Object Safety
///
/// Uses `async_trait` so the orchestrator can hold `Box<dyn VideoProvider>`;
/// native async trait methods are not object-safe.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Provider name used in logs and as the hit's `provider`
    /// (e.g. "official", "piped:https://pipedapi.kavin.rocks").
    fn name(&self) -> &str;

    /// The tier this provider belongs to.
    fn tier(&self) -> ProviderTier;

    /// Base URL this provider calls.
    fn endpoint(&self) -> &str;

    /// Runs one search. A successful response with no matches is `Ok(vec![])`.
    async fn search(
        &self,
        query: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<VideoItem>, ProviderError>;
}
