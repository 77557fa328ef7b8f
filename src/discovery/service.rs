//! The public entry point composing gate, cache and providers.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheRecord, TopicCache, now_epoch_secs};
use crate::config::{DEFAULT_QUERY_QUALIFIERS, DiscoveryConfig};
use crate::db::Database;
use crate::plans::PlanSource;
use crate::provider::{
    DEFAULT_MAX_RESULTS, FallbackOrchestrator, SearchOptions, build_default_orchestrator,
};
use crate::topic::{CourseTopicGate, normalize_topic};
use crate::video::{VideoItem, filter_relevant};

use super::{DiscoveryError, InflightTopics};

/// Suggestions for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSuggestions {
    /// The normalized topic the suggestions were computed for.
    pub topic: String,
    pub videos: Vec<VideoItem>,
    /// True when served from the cache rather than a live fetch.
    pub from_cache: bool,
}

/// Topic video discovery: authorization, caching and tiered provider fallback.
#[derive(Debug)]
pub struct DiscoveryService {
    gate: CourseTopicGate,
    cache: TopicCache,
    orchestrator: FallbackOrchestrator,
    inflight: InflightTopics,
    query_qualifiers: String,
    max_results_cap: usize,
}

impl DiscoveryService {
    /// Assembles a service from its parts with default qualifiers and cap.
    #[must_use]
    pub fn new(gate: CourseTopicGate, cache: TopicCache, orchestrator: FallbackOrchestrator) -> Self {
        Self {
            gate,
            cache,
            orchestrator,
            inflight: InflightTopics::new(),
            query_qualifiers: DEFAULT_QUERY_QUALIFIERS.to_string(),
            max_results_cap: DEFAULT_MAX_RESULTS,
        }
    }

    /// Builds the full service described by `config`.
    #[must_use]
    pub fn from_config(config: &DiscoveryConfig, db: Database, plans: Arc<dyn PlanSource>) -> Self {
        Self::new(
            CourseTopicGate::new(plans),
            TopicCache::with_policy(db, config.cache_policy),
            build_default_orchestrator(config),
        )
        .with_query_qualifiers(&config.query_qualifiers)
        .with_max_results_cap(config.max_results_cap)
    }

    /// Replaces the words appended to topics for suggestion searches.
    #[must_use]
    pub fn with_query_qualifiers(mut self, qualifiers: &str) -> Self {
        self.query_qualifiers = qualifiers.trim().to_string();
        self
    }

    /// Replaces the upper bound for `max_results`.
    #[must_use]
    pub fn with_max_results_cap(mut self, cap: usize) -> Self {
        self.max_results_cap = cap.max(1);
        self
    }

    /// The topic cache this service reads and writes.
    #[must_use]
    pub fn cache(&self) -> &TopicCache {
        &self.cache
    }

    /// The gate used to authorize topics.
    #[must_use]
    pub fn gate(&self) -> &CourseTopicGate {
        &self.gate
    }

    /// Clamps a requested result count into `1..=cap`.
    #[must_use]
    pub fn clamp_max_results(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_results_cap)
    }

    /// Search query for a normalized topic: the topic plus the qualifiers.
    #[must_use]
    pub fn suggestion_query(&self, normalized_topic: &str) -> String {
        if self.query_qualifiers.is_empty() {
            normalized_topic.to_string()
        } else {
            format!("{normalized_topic} {}", self.query_qualifiers)
        }
    }

    /// Returns relevant videos for a topic from the user's learning plans.
    ///
    /// Serves a fresh cache when it holds enough records; otherwise fetches
    /// live, filters for relevance, caches the result, and falls back to any
    /// stale cache if every provider fails. Concurrent cold requests for one
    /// topic share a single fetch: callers queued behind it are served
    /// whatever it cached.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::BadRequest`] if the topic is blank
    /// - [`DiscoveryError::Forbidden`] if the topic is not in the user's plans
    /// - [`DiscoveryError::Unavailable`] if plans cannot be read, or no live
    ///   results and no cache exist
    #[instrument(skip(self))]
    pub async fn get_suggestions(
        &self,
        user_id: &str,
        topic: &str,
        max_results: usize,
    ) -> Result<TopicSuggestions, DiscoveryError> {
        let normalized = normalize_topic(topic);
        if normalized.is_empty() {
            return Err(DiscoveryError::bad_request("topic must not be blank"));
        }

        match self.gate.authorize(user_id, &normalized).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(topic = %normalized, "Topic not in user's active plans");
                return Err(DiscoveryError::Forbidden);
            }
            Err(error) => {
                warn!(error = %error, "Cannot read learning plans");
                return Err(DiscoveryError::unavailable(error));
            }
        }

        let limit = self.clamp_max_results(max_results);
        let mut cached = self.read_cache(&normalized, limit).await;
        if cached.len() >= limit && self.cache.is_fresh(&cached, limit, now_epoch_secs()) {
            debug!(count = cached.len(), "Serving fresh cache");
            return Ok(from_records(normalized, &cached, true));
        }

        let queued_at = now_epoch_secs();
        let inflight = self.inflight.acquire(&normalized).await;
        if inflight.waited() {
            // The holder's results are served as-is, even when fewer than `limit`.
            cached = self.read_cache(&normalized, limit).await;
            if refreshed_since(&cached, queued_at) {
                debug!(count = cached.len(), "Serving cache filled by concurrent request");
                return Ok(from_records(normalized, &cached, true));
            }
        }

        let query = self.suggestion_query(&normalized);
        let opts = SearchOptions::with_max_results(self.max_results_cap);
        match self.orchestrator.search(&query, &opts).await {
            Ok(hit) => {
                let mut videos = filter_relevant(hit.videos, &normalized);
                videos.truncate(limit);
                let report = self.cache.upsert(&normalized, hit.tier, &videos).await;
                info!(
                    provider = %hit.provider,
                    returned = videos.len(),
                    cached = report.stored,
                    "Served live suggestions"
                );
                Ok(TopicSuggestions {
                    topic: normalized,
                    videos,
                    from_cache: false,
                })
            }
            Err(error) if !cached.is_empty() => {
                warn!(
                    error = %error,
                    count = cached.len(),
                    "Live fetch failed; serving stale cache"
                );
                Ok(from_records(normalized, &cached, true))
            }
            Err(error) => {
                warn!(error = %error, "Live fetch failed and nothing is cached");
                Err(DiscoveryError::unavailable(error))
            }
        }
    }

    /// Unauthenticated, uncached search used by the rest of the platform.
    ///
    /// `opts.max_results` is clamped into `1..=cap`.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::BadRequest`] if the query is blank
    /// - [`DiscoveryError::Unavailable`] if every provider fails
    #[instrument(skip(self, opts))]
    pub async fn search_videos(
        &self,
        query: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<VideoItem>, DiscoveryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DiscoveryError::bad_request("query must not be blank"));
        }
        let opts = SearchOptions {
            max_results: self.clamp_max_results(opts.max_results),
            ..opts.clone()
        };
        self.orchestrator
            .search(query, &opts)
            .await
            .map(|hit| hit.videos)
            .map_err(|error| {
                warn!(error = %error, "Video search failed on every provider");
                DiscoveryError::unavailable(error)
            })
    }

    async fn read_cache(&self, topic: &str, limit: usize) -> Vec<CacheRecord> {
        self.cache.read(topic, limit).await.unwrap_or_else(|error| {
            warn!(error = %error, "Cache read failed; treating as empty");
            Vec::new()
        })
    }
}

/// True when some record was written at or after `since`.
fn refreshed_since(records: &[CacheRecord], since: i64) -> bool {
    records.iter().any(|record| record.created_at >= since)
}

fn from_records(topic: String, records: &[CacheRecord], from_cache: bool) -> TopicSuggestions {
    TopicSuggestions {
        topic,
        videos: records.iter().map(CacheRecord::to_video_item).collect(),
        from_cache,
    }
}
