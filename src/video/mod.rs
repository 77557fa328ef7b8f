//! Provider-agnostic video results.
//!
//! - [`VideoItem`] - canonical shape every provider tier normalizes into
//! - [`duration`] - total duration parsing (ISO-8601, seconds, numeric strings)
//! - [`relevance`] - keyword relevance filter against the requested topic

pub mod duration;
pub mod relevance;

pub use duration::{coerce_duration, parse_iso8601};
pub use relevance::{filter_relevant, is_relevant, topic_tokens};

use serde::{Deserialize, Serialize};

/// Origin of the canonical watch and thumbnail URLs.
pub const PLATFORM_ORIGIN: &str = "https://www.youtube.com";

/// A single search result, independent of which backend produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    /// Platform-native video identifier.
    pub external_id: String,
    pub title: String,
    pub description: String,
    /// Canonical playable URL.
    pub content_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: u64,
    pub channel_title: String,
    /// Best-effort publish date; format varies by source.
    pub published_at: String,
}

impl VideoItem {
    /// Canonical watch URL for a video id.
    #[must_use]
    pub fn watch_url(video_id: &str) -> String {
        format!("{PLATFORM_ORIGIN}/watch?v={video_id}")
    }

    /// Deterministic thumbnail used when a provider omits one.
    #[must_use]
    pub fn fallback_thumbnail(video_id: &str) -> String {
        format!("https://img.youtube.com/vi/{video_id}/mqdefault.jpg")
    }
}
