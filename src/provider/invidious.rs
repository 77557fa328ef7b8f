//! Invidious mirror provider (mirror family B).
//!
//! Supports `order` (as `sort_by`) and `duration`; `channel_id` is not
//! forwarded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::video::VideoItem;

use super::http_client::{build_provider_http_client, check_base_url, endpoint_url, fetch_json};
use super::normalize::{entries_under, normalize_entries, normalize_invidious};
use super::{DurationBucket, ProviderError, ProviderTier, SearchOptions, VideoProvider};

/// Searches one Invidious instance through `/api/v1/search`.
pub struct InvidiousProvider {
    client: Client,
    base_url: String,
    name: String,
    call_timeout: Duration,
}

impl InvidiousProvider {
    /// Creates a provider for the instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientSetup`] if `base_url` is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, call_timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let name = format!("invidious:{base_url}");
        check_base_url(&name, &base_url)?;
        Ok(Self {
            client: build_provider_http_client(&name, call_timeout)?,
            base_url,
            name,
            call_timeout,
        })
    }
}

impl std::fmt::Debug for InvidiousProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvidiousProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VideoProvider for InvidiousProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Invidious
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(skip(self, opts), fields(provider = %self.name))]
    async fn search(
        &self,
        query: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<VideoItem>, ProviderError> {
        let mut params = vec![
            ("q", query),
            ("type", "video"),
            ("sort_by", opts.order.invidious_sort()),
        ];
        if opts.duration != DurationBucket::Any {
            params.push(("duration", opts.duration.as_str()));
        }

        let url = endpoint_url(&self.name, &self.base_url, "/api/v1/search", &params)?;
        let body = fetch_json(&self.client, &self.name, url, self.call_timeout).await?;

        let entries = entries_under(&body, &[])
            .ok_or_else(|| ProviderError::malformed(&self.name, "expected a JSON array"))?;

        let base_url = self.base_url.as_str();
        let mut videos = normalize_entries(&self.name, entries, |entry| {
            normalize_invidious(entry, base_url)
        });
        videos.truncate(opts.max_results);
        Ok(videos)
    }
}
