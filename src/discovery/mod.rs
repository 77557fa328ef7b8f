//! Topic suggestion service.
//!
//! [`DiscoveryService::get_suggestions`] is the single entry point for
//! plan-scoped suggestions: it authorizes the topic, consults the cache,
//! falls back across providers, filters for relevance and writes back.
//! [`DiscoveryService::search_videos`] is the raw, unscoped search.

mod error;
mod inflight;
mod service;

pub use error::DiscoveryError;
pub use inflight::{InflightGuard, InflightTopics};
pub use service::{DiscoveryService, TopicSuggestions};
