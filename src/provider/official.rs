//! Official API provider.
//!
//! A search costs two requests: `search` for the matching ids and snippets,
//! then a batched `videos` lookup for exact durations. The lookup is
//! best-effort; if it fails the videos keep duration 0.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::DEFAULT_OFFICIAL_BASE_URL;
use crate::video::VideoItem;

use super::http_client::{
    build_provider_http_client, check_base_url, endpoint_url, fetch_json,
};
use super::normalize::{entries_under, normalize_entries, normalize_official, official_durations};
use super::{DurationBucket, ProviderError, ProviderTier, SearchOptions, VideoProvider};

/// The API rejects `maxResults` above this.
const MAX_RESULTS_PER_CALL: usize = 50;

const PROVIDER_NAME: &str = "official";

/// Searches through the official, credentialed API.
pub struct OfficialApiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    call_timeout: Duration,
}

impl OfficialApiProvider {
    /// Creates a provider against the public API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if HTTP client construction fails or the key
    /// is blank.
    pub fn new(api_key: &str, call_timeout: Duration) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, DEFAULT_OFFICIAL_BASE_URL, call_timeout)
    }

    /// Creates a provider with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if HTTP client construction fails, the key is
    /// blank, or `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        call_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::client_setup(
                PROVIDER_NAME,
                "API key must not be blank",
            ));
        }
        if api_key.chars().any(char::is_control) {
            return Err(ProviderError::client_setup(
                PROVIDER_NAME,
                "API key contains control characters",
            ));
        }
        check_base_url(PROVIDER_NAME, base_url)?;
        Ok(Self {
            client: build_provider_http_client(PROVIDER_NAME, call_timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            call_timeout,
        })
    }

    async fn fill_durations(&self, videos: &mut [VideoItem]) {
        let ids = videos
            .iter()
            .map(|v| v.external_id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let url = match endpoint_url(
            PROVIDER_NAME,
            &self.base_url,
            "/videos",
            &[
                ("part", "contentDetails"),
                ("id", ids.as_str()),
                ("key", self.api_key.as_str()),
            ],
        ) {
            Ok(url) => url,
            Err(error) => {
                warn!(error = %error, "Cannot build duration lookup URL");
                return;
            }
        };

        match fetch_json(&self.client, PROVIDER_NAME, url, self.call_timeout).await {
            Ok(body) => {
                let durations = official_durations(&body);
                for video in videos.iter_mut() {
                    if let Some(seconds) = durations.get(&video.external_id) {
                        video.duration_seconds = *seconds;
                    }
                }
                debug!(resolved = durations.len(), "Resolved official durations");
            }
            Err(error) => warn!(
                error = %error,
                "Duration lookup failed; keeping unknown durations"
            ),
        }
    }
}

impl std::fmt::Debug for OfficialApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfficialApiProvider")
            .field("base_url", &self.base_url)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VideoProvider for OfficialApiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn tier(&self) -> ProviderTier {
        ProviderTier::Official
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(skip(self, opts), fields(provider = PROVIDER_NAME))]
    async fn search(
        &self,
        query: &str,
        opts: &SearchOptions,
    ) -> Result<Vec<VideoItem>, ProviderError> {
        let max_results = opts.max_results.clamp(1, MAX_RESULTS_PER_CALL).to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("order", opts.order.as_str()),
        ];
        if let Some(channel_id) = opts.channel_id.as_deref() {
            params.push(("channelId", channel_id));
        }
        if opts.duration != DurationBucket::Any {
            params.push(("videoDuration", opts.duration.as_str()));
        }
        params.push(("key", self.api_key.as_str()));

        let url = endpoint_url(PROVIDER_NAME, &self.base_url, "/search", &params)?;
        let body = fetch_json(&self.client, PROVIDER_NAME, url, self.call_timeout).await?;

        let entries = match entries_under(&body, &["items"]) {
            Some(entries) => entries,
            None if body.is_object() => Vec::new(),
            None => {
                return Err(ProviderError::malformed(
                    PROVIDER_NAME,
                    "expected an object with an `items` array",
                ));
            }
        };

        let mut videos = normalize_entries(PROVIDER_NAME, entries, normalize_official);
        videos.truncate(opts.max_results);
        if !videos.is_empty() {
            self.fill_durations(&mut videos).await;
        }
        Ok(videos)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use crate::provider::SearchOrder;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    fn search_body() -> Value {
        json!({
            "kind": "youtube#searchListResponse",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v1"},
                 "snippet": {"title": "Rust course part 1", "channelTitle": "Edu"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC1"},
                 "snippet": {"title": "Rust channel"}},
                {"id": {"kind": "youtube#video", "videoId": "v2"},
                 "snippet": {"title": "Rust course part 2"}}
            ]
        })
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let err = OfficialApiProvider::new("  ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProviderError::ClientSetup { .. }));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let provider = OfficialApiProvider::new("secret-key", Duration::from_secs(1)).unwrap();
        assert!(!format!("{provider:?}").contains("secret-key"));
    }

    #[tokio::test]
    async fn test_search_resolves_durations() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust course"))
            .and(query_param("type", "video"))
            .and(query_param("key", "k"))
            .and(query_param("maxResults", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "v1,v2"))
            .and(query_param("part", "contentDetails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": "v1", "contentDetails": {"duration": "PT10M"}},
                    {"id": "v2", "contentDetails": {"duration": "PT1H2M3S"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            OfficialApiProvider::with_base_url("k", &server.uri(), Duration::from_secs(5)).unwrap();
        let videos = provider
            .search("rust course", &SearchOptions::with_max_results(5))
            .await
            .unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].external_id, "v1");
        assert_eq!(videos[0].duration_seconds, 600);
        assert_eq!(videos[1].duration_seconds, 3723);
    }

    #[tokio::test]
    async fn test_failed_duration_lookup_keeps_results() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider =
            OfficialApiProvider::with_base_url("k", &server.uri(), Duration::from_secs(5)).unwrap();
        let videos = provider
            .search("rust", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(videos.len(), 2);
        assert!(videos.iter().all(|v| v.duration_seconds == 0));
    }

    #[tokio::test]
    async fn test_quota_error_payload_is_upstream_failure() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 403, "message": "quotaExceeded"}
            })))
            .mount(&server)
            .await;

        let provider =
            OfficialApiProvider::with_base_url("k", &server.uri(), Duration::from_secs(5)).unwrap();
        let err = provider
            .search("rust", &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_filters_are_passed_through() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("channelId", "UCedu"))
            .and(query_param("order", "viewCount"))
            .and(query_param("videoDuration", "long"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            OfficialApiProvider::with_base_url("k", &server.uri(), Duration::from_secs(5)).unwrap();
        let opts = SearchOptions {
            channel_id: Some("UCedu".to_string()),
            order: SearchOrder::ViewCount,
            duration: DurationBucket::Long,
            ..SearchOptions::default()
        };
        let videos = provider.search("rust", &opts).await.unwrap();
        assert!(videos.is_empty());
    }
}
