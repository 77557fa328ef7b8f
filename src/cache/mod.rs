//! Persistent per-topic video cache.
//!
//! Videos fetched for a normalized topic are kept in SQLite, keyed by
//! `(topic, external id)`. Records are never evicted; the [`CachePolicy`]
//! only decides whether a read is fresh enough to skip a live fetch.
//!
//! # Example
//!
//! ```ignore
//! let cache = TopicCache::new(db);
//! let records = cache.read("machine learning", 10).await?;
//! if !cache.is_fresh(&records, 10, now_epoch_secs()) {
//!     // fetch, then:
//!     cache.upsert("machine learning", ProviderTier::Piped, &videos).await;
//! }
//! ```

mod error;
mod record;

pub use error::CacheError;
pub use record::CacheRecord;

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, instrument, warn};

use crate::config::CachePolicy;
use crate::db::Database;
use crate::provider::ProviderTier;
use crate::video::VideoItem;

use record::{CACHE_COLUMNS, CacheRow};

/// Current time as Unix epoch seconds.
#[must_use]
pub fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

/// Freshness rule.
///
/// Fresh iff at least `min(limit, policy.min_fresh_records)` records exist
/// and the newest one was refreshed less than `policy.fresh_for` ago.
#[must_use]
pub fn is_fresh(records: &[CacheRecord], limit: usize, now: i64, policy: &CachePolicy) -> bool {
    let required = limit.min(policy.min_fresh_records);
    if records.len() < required {
        return false;
    }
    let Some(newest) = records.iter().map(|r| r.created_at).max() else {
        return false;
    };
    let fresh_for = i64::try_from(policy.fresh_for.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(newest) < fresh_for
}

/// Outcome of a batch upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
    /// Rows inserted or refreshed.
    pub stored: usize,
    /// Videos skipped because their write failed.
    pub failed: usize,
}

/// SQLite-backed topic cache.
#[derive(Debug, Clone)]
pub struct TopicCache {
    db: Database,
    policy: CachePolicy,
}

impl TopicCache {
    /// Creates a cache with the default freshness policy.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self::with_policy(db, CachePolicy::default())
    }

    /// Creates a cache with an explicit freshness policy.
    #[must_use]
    pub fn with_policy(db: Database, policy: CachePolicy) -> Self {
        Self { db, policy }
    }

    /// The freshness policy in use.
    #[must_use]
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Reads up to `limit` records for `topic`, newest first.
    ///
    /// Rows that cannot be mapped are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn read(&self, topic: &str, limit: usize) -> Result<Vec<CacheRecord>, CacheError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {CACHE_COLUMNS} FROM topic_video_cache \
             WHERE topic_normalized = ? \
             ORDER BY created_at DESC, id DESC \
             LIMIT ?"
        );
        let rows = sqlx::query_as::<_, CacheRow>(&sql)
            .bind(topic)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(self.db.pool())
            .await?;

        let records: Vec<CacheRecord> = rows
            .into_iter()
            .filter_map(|row| match row.into_record() {
                Ok(record) => Some(record),
                Err(error) => {
                    warn!(error = %error, "Skipping unreadable cache row");
                    None
                }
            })
            .collect();
        debug!(count = records.len(), "Read cached videos");
        Ok(records)
    }

    /// Applies this cache's policy to `records` (see [`is_fresh`]).
    #[must_use]
    pub fn is_fresh(&self, records: &[CacheRecord], limit: usize, now: i64) -> bool {
        is_fresh(records, limit, now, &self.policy)
    }

    /// Inserts or refreshes every video under `topic`, stamped with the
    /// current time.
    pub async fn upsert(
        &self,
        topic: &str,
        source: ProviderTier,
        videos: &[VideoItem],
    ) -> UpsertReport {
        self.upsert_at(topic, source, videos, now_epoch_secs()).await
    }

    /// Inserts or refreshes every video under `topic`, stamped with `now`.
    ///
    /// A refresh updates the mutable fields and `created_at`; `source` and
    /// the key are kept. Each video is written independently, so one failure
    /// does not abort the batch.
    #[instrument(skip(self, videos), fields(count = videos.len()))]
    pub async fn upsert_at(
        &self,
        topic: &str,
        source: ProviderTier,
        videos: &[VideoItem],
        now: i64,
    ) -> UpsertReport {
        let mut report = UpsertReport::default();
        for video in videos {
            match self.upsert_one(topic, source, video, now).await {
                Ok(()) => report.stored += 1,
                Err(error) => {
                    report.failed += 1;
                    warn!(
                        external_id = %video.external_id,
                        error = %error,
                        "Failed to cache video, skipping"
                    );
                }
            }
        }
        debug!(stored = report.stored, failed = report.failed, "Cached videos");
        report
    }

    async fn upsert_one(
        &self,
        topic: &str,
        source: ProviderTier,
        video: &VideoItem,
        now: i64,
    ) -> Result<(), CacheError> {
        let published_at = Some(video.published_at.as_str()).filter(|p| !p.is_empty());
        sqlx::query(
            r"INSERT INTO topic_video_cache (
                  topic_normalized, external_id, title, description, thumbnail_url,
                  content_url, duration_seconds, channel_title, published_at, source, created_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              ON CONFLICT (topic_normalized, external_id) DO UPDATE SET
                  title = excluded.title,
                  description = excluded.description,
                  thumbnail_url = excluded.thumbnail_url,
                  duration_seconds = excluded.duration_seconds,
                  channel_title = excluded.channel_title,
                  published_at = excluded.published_at,
                  created_at = excluded.created_at",
        )
        .bind(topic)
        .bind(&video.external_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.content_url)
        .bind(i64::try_from(video.duration_seconds).unwrap_or(i64::MAX))
        .bind(&video.channel_title)
        .bind(published_at)
        .bind(source.as_str())
        .bind(now)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Number of cached records for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self, topic: &str) -> Result<u64, CacheError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM topic_video_cache WHERE topic_normalized = ?")
                .bind(topic)
                .fetch_one(self.db.pool())
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
