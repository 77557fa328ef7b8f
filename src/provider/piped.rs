//! Piped mirror provider (mirror family A).
//!
//! Piped instances ignore every search filter except the entity type, so
//! `order`, `duration` and `channel_id` are not forwarded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::video::VideoItem;

use super::http_client::{build_provider_http_client, check_base_url, endpoint_url, fetch_json};
use super::normalize::{entries_under, normalize_entries, normalize_piped};
use super::{ProviderError, ProviderTier, SearchOptions, VideoProvider};

/// Wrapper keys Piped instances have used for the result list.
const RESULT_KEYS: [&str; 2] = ["items", "relatedStreams"];

/// Searches one Piped instance.
pub struct PipedProvider {
    client: Client,
    base_url: String,
    name: String,
    call_timeout: Duration,
}

impl PipedProvider {
    /// Creates a provider for the instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientSetup`] if `base_url` is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, call_timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let name = format!("piped:{base_url}");
        check_base_url(&name, &base_url)?;
        Ok(Self {
            client: build_provider_http_client(&name, call_timeout)?,
            base_url,
            name,
            call_timeout,
        })
    }
}

impl std::fmt::Debug for PipedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipedProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VideoProvider for PipedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Piped
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
        let url = endpoint_url(
            &self.name,
            &self.base_url,
            "/search",
            &[("q", query), ("filter", "videos")],
        )?;
        let body = fetch_json(&self.client, &self.name, url, self.call_timeout).await?;

        let entries = entries_under(&body, &RESULT_KEYS).ok_or_else(|| {
            ProviderError::malformed(&self.name, "expected an array or an `items` wrapper")
        })?;

        let mut videos = normalize_entries(&self.name, entries, normalize_piped);
        videos.truncate(opts.max_results);
        Ok(videos)
    }
}
