//! Cache row mapping.
//!
//! Column names are snake_case and integers are signed in SQLite; the domain
//! [`CacheRecord`] uses typed fields. This is the only place the two meet.

use serde::Serialize;
use sqlx::FromRow;

use crate::provider::ProviderTier;
use crate::video::VideoItem;

use super::CacheError;

/// Columns selected by every cache read, in [`CacheRow`] field order.
pub(crate) const CACHE_COLUMNS: &str = "id, topic_normalized, external_id, title, description, \
     thumbnail_url, content_url, duration_seconds, channel_title, published_at, source, created_at";

/// One cached video for one normalized topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub id: i64,
    pub topic_normalized: String,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub content_url: String,
    pub duration_seconds: u64,
    pub channel_title: String,
    pub published_at: Option<String>,
    /// Tier that first produced the record; never changed by a refresh.
    pub source: ProviderTier,
    /// Unix epoch seconds of the last refresh.
    pub created_at: i64,
}

impl CacheRecord {
    /// Converts the record back into the provider-agnostic result shape.
    #[must_use]
    pub fn to_video_item(&self) -> VideoItem {
        VideoItem {
            external_id: self.external_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            content_url: self.content_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            duration_seconds: self.duration_seconds,
            channel_title: self.channel_title.clone(),
            published_at: self.published_at.clone().unwrap_or_default(),
        }
    }

    /// Seconds since the last refresh, relative to `now` (epoch seconds).
    #[must_use]
    pub fn age_secs(&self, now: i64) -> i64 {
        now.saturating_sub(self.created_at)
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CacheRow {
    id: i64,
    topic_normalized: String,
    external_id: String,
    title: String,
    description: String,
    thumbnail_url: String,
    content_url: String,
    duration_seconds: i64,
    channel_title: String,
    published_at: Option<String>,
    source: String,
    created_at: i64,
}

impl CacheRow {
    pub(crate) fn into_record(self) -> Result<CacheRecord, CacheError> {
        let source = self
            .source
            .parse::<ProviderTier>()
            .map_err(|reason| CacheError::CorruptRow {
                id: self.id,
                reason,
            })?;
        Ok(CacheRecord {
            id: self.id,
            topic_normalized: self.topic_normalized,
            external_id: self.external_id,
            title: self.title,
            description: self.description,
            thumbnail_url: self.thumbnail_url,
            content_url: self.content_url,
            duration_seconds: u64::try_from(self.duration_seconds).unwrap_or(0),
            channel_title: self.channel_title,
            published_at: self.published_at,
            source,
            created_at: self.created_at,
        })
    }
}
