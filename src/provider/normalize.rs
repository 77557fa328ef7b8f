//! Per-tier mapping of raw search entries into [`VideoItem`].
//!
//! Each tier gets its own serde structs with every field optional, and one
//! function that turns a single raw entry into a `VideoItem` or a
//! [`NormalizeError`]. Entries are decoded one at a time so a single bad entry
//! is dropped without discarding its siblings.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::video::{PLATFORM_ORIGIN, VideoItem, coerce_duration};

use super::NormalizeError;

/// Maximum description length kept, in characters.
pub const DESCRIPTION_LIMIT: usize = 500;

/// Title used when a provider omits one.
pub const UNTITLED: &str = "Untitled";

const OFFICIAL_VIDEO_KIND: &str = "youtube#video";
const OFFICIAL_THUMBNAIL_ORDER: [&str; 3] = ["medium", "high", "default"];

// ==================== Official API ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfficialSearchEntry {
    id: Option<OfficialEntryId>,
    snippet: Option<OfficialSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfficialEntryId {
    kind: Option<String>,
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfficialSnippet {
    title: Option<String>,
    description: Option<String>,
    thumbnails: Option<HashMap<String, OfficialThumbnail>>,
    channel_title: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OfficialThumbnail {
    url: Option<String>,
}

/// Maps one official `search` entry.
///
/// # Errors
///
/// [`NormalizeError::NotAVideo`] for channel/playlist hits,
/// [`NormalizeError::MissingId`] without `id.videoId`, and
/// [`NormalizeError::Malformed`] if the entry is not an object of this shape.
pub fn normalize_official(entry: Value) -> Result<VideoItem, NormalizeError> {
    let entry: OfficialSearchEntry = decode(entry)?;
    let id = entry.id.ok_or(NormalizeError::MissingId)?;
    if let Some(kind) = id.kind
        && kind != OFFICIAL_VIDEO_KIND
    {
        return Err(NormalizeError::NotAVideo { kind });
    }
    let video_id = non_blank(id.video_id).ok_or(NormalizeError::MissingId)?;
    let snippet = entry.snippet.unwrap_or_default();

    let thumbnail = snippet.thumbnails.as_ref().and_then(|thumbnails| {
        OFFICIAL_THUMBNAIL_ORDER
            .iter()
            .find_map(|size| thumbnails.get(*size).and_then(|t| non_blank(t.url.clone())))
    });

    Ok(build_item(
        video_id,
        snippet.title,
        snippet.description,
        thumbnail,
        // Filled by the follow-up `videos` lookup.
        0,
        snippet.channel_title,
        snippet.published_at,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfficialVideoEntry {
    id: Option<String>,
    content_details: Option<OfficialContentDetails>,
}

#[derive(Debug, Deserialize)]
struct OfficialContentDetails {
    duration: Option<Value>,
}

/// Reads `id -> seconds` pairs from an official `videos` response body.
///
/// Entries without an id are skipped.
#[must_use]
pub fn official_durations(body: &Value) -> HashMap<String, u64> {
    entries_under(body, &["items"])
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<OfficialVideoEntry>(entry).ok())
        .filter_map(|entry| {
            let id = non_blank(entry.id)?;
            let seconds = entry
                .content_details
                .and_then(|details| details.duration)
                .as_ref()
                .map_or(0, coerce_duration);
            Some((id, seconds))
        })
        .collect()
}

// ==================== Piped ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    video_id: Option<String>,
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    short_description: Option<String>,
    thumbnail: Option<String>,
    thumbnail_url: Option<String>,
    duration: Option<Value>,
    length_seconds: Option<Value>,
    uploader_name: Option<String>,
    uploader: Option<String>,
    author: Option<String>,
    uploaded_date: Option<String>,
    published_text: Option<String>,
}

/// Maps one Piped search entry.
///
/// The id comes from `videoId`, else the `v` query parameter of `url`.
///
/// # Errors
///
/// [`NormalizeError::NotAVideo`] for non-stream entries,
/// [`NormalizeError::MissingId`] when no id can be found, and
/// [`NormalizeError::Malformed`] if the entry is not an object of this shape.
pub fn normalize_piped(entry: Value) -> Result<VideoItem, NormalizeError> {
    let entry: PipedEntry = decode(entry)?;
    if let Some(kind) = entry.kind.as_deref()
        && !matches!(kind, "stream" | "video")
    {
        return Err(NormalizeError::NotAVideo {
            kind: kind.to_string(),
        });
    }

    let video_id = non_blank(entry.video_id)
        .or_else(|| entry.url.as_deref().and_then(video_id_from_url))
        .ok_or(NormalizeError::MissingId)?;

    let duration = entry
        .duration
        .as_ref()
        .or(entry.length_seconds.as_ref())
        .map_or(0, coerce_duration);

    Ok(build_item(
        video_id,
        entry.title,
        entry.description.or(entry.short_description),
        non_blank(entry.thumbnail).or_else(|| non_blank(entry.thumbnail_url)),
        duration,
        entry.uploader_name.or(entry.uploader).or(entry.author),
        entry.uploaded_date.or(entry.published_text),
    ))
}

/// Extracts the `v` query parameter of a watch URL.
///
/// Path-only URLs such as `/watch?v=abc` are resolved against the platform
/// origin first.
#[must_use]
pub fn video_id_from_url(raw: &str) -> Option<String> {
    let origin = Url::parse(PLATFORM_ORIGIN).ok()?;
    let url = origin.join(raw.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .and_then(|(_, value)| non_blank(Some(value.into_owned())))
}

// ==================== Invidious ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    video_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    description_html: Option<String>,
    video_thumbnails: Option<Vec<InvidiousThumbnail>>,
    length_seconds: Option<Value>,
    author: Option<String>,
    published_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvidiousThumbnail {
    quality: Option<String>,
    url: Option<String>,
}

/// Maps one Invidious search entry.
///
/// Thumbnail URLs are made absolute against `instance_base` when the mirror
/// returns them protocol-relative or path-only.
///
/// # Errors
///
/// [`NormalizeError::NotAVideo`] for channel/playlist entries,
/// [`NormalizeError::MissingId`] without `videoId`, and
/// [`NormalizeError::Malformed`] if the entry is not an object of this shape.
pub fn normalize_invidious(entry: Value, instance_base: &str) -> Result<VideoItem, NormalizeError> {
    let entry: InvidiousEntry = decode(entry)?;
    if let Some(kind) = entry.kind.as_deref()
        && kind != "video"
    {
        return Err(NormalizeError::NotAVideo {
            kind: kind.to_string(),
        });
    }
    let video_id = non_blank(entry.video_id).ok_or(NormalizeError::MissingId)?;

    let thumbnails = entry.video_thumbnails.unwrap_or_default();
    let thumbnail = thumbnails
        .iter()
        .find(|t| t.quality.as_deref() == Some("medium"))
        .or_else(|| thumbnails.first())
        .and_then(|t| non_blank(t.url.clone()))
        .and_then(|raw| absolute_url(&raw, instance_base));

    Ok(build_item(
        video_id,
        entry.title,
        entry.description.or(entry.description_html),
        thumbnail,
        entry.length_seconds.as_ref().map_or(0, coerce_duration),
        entry.author,
        entry.published_text,
    ))
}

fn absolute_url(raw: &str, base: &str) -> Option<String> {
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if let Ok(url) = Url::parse(raw) {
        return Some(url.into());
    }
    Url::parse(base)
        .and_then(|base| base.join(raw))
        .ok()
        .map(Into::into)
}

// ==================== Shared ====================

/// Pulls the entry list out of a payload.
///
/// Accepts a bare array, or an object carrying an array under the first of
/// `keys` that is present. Returns `None` for any other shape.
#[must_use]
pub fn entries_under(body: &Value, keys: &[&str]) -> Option<Vec<Value>> {
    match body {
        Value::Array(entries) => Some(entries.clone()),
        Value::Object(fields) => keys
            .iter()
            .find_map(|key| fields.get(*key))
            .and_then(Value::as_array)
            .cloned(),
        _ => None,
    }
}

/// Normalizes every entry, dropping failures and repeated ids.
///
/// Order is preserved; the first occurrence of an id wins.
pub fn normalize_entries<F>(provider: &str, entries: Vec<Value>, mut normalize: F) -> Vec<VideoItem>
where
    F: FnMut(Value) -> Result<VideoItem, NormalizeError>,
{
    let total = entries.len();
    let mut seen = HashSet::new();
    let mut videos = Vec::with_capacity(total);
    for entry in entries {
        match normalize(entry) {
            Ok(video) => {
                if seen.insert(video.external_id.clone()) {
                    videos.push(video);
                }
            }
            Err(error) => debug!(provider, error = %error, "Dropping search entry"),
        }
    }
    debug!(provider, total, kept = videos.len(), "Normalized search entries");
    videos
}

/// Truncates to [`DESCRIPTION_LIMIT`] characters.
#[must_use]
pub fn truncate_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_LIMIT).collect()
}

fn decode<T: DeserializeOwned>(entry: Value) -> Result<T, NormalizeError> {
    serde_json::from_value(entry).map_err(|e| NormalizeError::Malformed(e.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build_item(
    video_id: String,
    title: Option<String>,
    description: Option<String>,
    thumbnail: Option<String>,
    duration_seconds: u64,
    channel_title: Option<String>,
    published_at: Option<String>,
) -> VideoItem {
    VideoItem {
        content_url: VideoItem::watch_url(&video_id),
        thumbnail_url: thumbnail.unwrap_or_else(|| VideoItem::fallback_thumbnail(&video_id)),
        title: non_blank(title).unwrap_or_else(|| UNTITLED.to_string()),
        description: truncate_description(description.as_deref().unwrap_or_default()),
        duration_seconds,
        channel_title: channel_title.unwrap_or_default(),
        published_at: published_at.unwrap_or_default(),
        external_id: video_id,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_official_entry_maps_snippet() {
        let video = normalize_official(json!({
            "kind": "youtube#searchResult",
            "id": {"kind": "youtube#video", "videoId": "abc123"},
            "snippet": {
                "title": "Rust Ownership",
                "description": "Borrowing explained",
                "channelTitle": "Rustacean",
                "publishedAt": "2024-01-02T03:04:05Z",
                "thumbnails": {
                    "default": {"url": "https://i.ytimg.com/vi/abc123/default.jpg"},
                    "high": {"url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg"}
                }
            }
        }))
        .unwrap();

        assert_eq!(video.external_id, "abc123");
        assert_eq!(video.content_url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(video.thumbnail_url, "https://i.ytimg.com/vi/abc123/hqdefault.jpg");
        assert_eq!(video.channel_title, "Rustacean");
        assert_eq!(video.duration_seconds, 0);
    }

    #[test]
    fn test_official_channel_is_not_a_video() {
        let err = normalize_official(json!({
            "id": {"kind": "youtube#channel", "channelId": "UC123"},
            "snippet": {"title": "A channel"}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::NotAVideo {
                kind: "youtube#channel".to_string()
            }
        );
    }

    #[test]
    fn test_official_missing_snippet_uses_defaults() {
        let video = normalize_official(json!({"id": {"videoId": "xyz"}})).unwrap();
        assert_eq!(video.title, UNTITLED);
        assert_eq!(video.thumbnail_url, VideoItem::fallback_thumbnail("xyz"));
        assert_eq!(video.description, "");
    }

    #[test]
    fn test_official_durations_reads_content_details() {
        let durations = official_durations(&json!({
            "items": [
                {"id": "a", "contentDetails": {"duration": "PT1H2M3S"}},
                {"id": "b", "contentDetails": {}},
                {"contentDetails": {"duration": "PT5S"}}
            ]
        }));
        assert_eq!(durations.get("a"), Some(&3723));
        assert_eq!(durations.get("b"), Some(&0));
        assert_eq!(durations.len(), 2);
    }

    #[test]
    fn test_piped_id_from_relative_url() {
        let video = normalize_piped(json!({
            "url": "/watch?v=dQw4w9WgXcQ",
            "type": "stream",
            "title": "Intro",
            "duration": 212,
            "uploaderName": "Someone",
            "thumbnail": "https://pipedproxy.example/vi/dQw4w9WgXcQ/hqdefault.jpg"
        }))
        .unwrap();
        assert_eq!(video.external_id, "dQw4w9WgXcQ");
        assert_eq!(video.duration_seconds, 212);
        assert_eq!(video.channel_title, "Someone");
    }

    #[test]
    fn test_piped_prefers_video_id_and_string_duration() {
        let video = normalize_piped(json!({
            "videoId": "direct",
            "url": "/watch?v=ignored",
            "lengthSeconds": "95",
            "author": "Fallback Author"
        }))
        .unwrap();
        assert_eq!(video.external_id, "direct");
        assert_eq!(video.duration_seconds, 95);
        assert_eq!(video.channel_title, "Fallback Author");
    }

    #[test]
    fn test_piped_channel_and_missing_id_are_rejected() {
        assert!(matches!(
            normalize_piped(json!({"type": "channel", "url": "/channel/UC1"})),
            Err(NormalizeError::NotAVideo { .. })
        ));
        assert_eq!(
            normalize_piped(json!({"title": "no id", "url": "/playlist?list=PL1"})),
            Err(NormalizeError::MissingId)
        );
    }

    #[test]
    fn test_piped_live_stream_duration_clamps_to_zero() {
        let video = normalize_piped(json!({"videoId": "live", "duration": -1})).unwrap();
        assert_eq!(video.duration_seconds, 0);
    }

    #[test]
    fn test_invidious_picks_medium_thumbnail_and_makes_absolute() {
        let video = normalize_invidious(
            json!({
                "type": "video",
                "videoId": "inv1",
                "title": "Lecture 1",
                "descriptionHtml": "<p>intro</p>",
                "videoThumbnails": [
                    {"quality": "maxres", "url": "/vi/inv1/maxres.jpg"},
                    {"quality": "medium", "url": "/vi/inv1/mqdefault.jpg"}
                ],
                "lengthSeconds": 3600,
                "author": "Uni",
                "publishedText": "3 years ago"
            }),
            "https://invidious.example",
        )
        .unwrap();
        assert_eq!(video.thumbnail_url, "https://invidious.example/vi/inv1/mqdefault.jpg");
        assert_eq!(video.description, "<p>intro</p>");
        assert_eq!(video.duration_seconds, 3600);
        assert_eq!(video.published_at, "3 years ago");
    }

    #[test]
    fn test_invidious_protocol_relative_thumbnail() {
        let video = normalize_invidious(
            json!({
                "videoId": "inv2",
                "videoThumbnails": [{"quality": "high", "url": "//i.ytimg.com/vi/inv2/hq.jpg"}]
            }),
            "https://invidious.example",
        )
        .unwrap();
        assert_eq!(video.thumbnail_url, "https://i.ytimg.com/vi/inv2/hq.jpg");
    }

    #[test]
    fn test_invidious_playlist_is_not_a_video() {
        assert!(matches!(
            normalize_invidious(json!({"type": "playlist", "playlistId": "PL"}), "https://x"),
            Err(NormalizeError::NotAVideo { .. })
        ));
    }

    #[test]
    fn test_non_object_entry_is_malformed() {
        assert!(matches!(
            normalize_piped(json!("just a string")),
            Err(NormalizeError::Malformed(_))
        ));
        assert!(matches!(
            normalize_piped(json!({"videoId": 42})),
            Err(NormalizeError::Malformed(_))
        ));
    }

    #[test]
    fn test_description_truncation_counts_chars() {
        let long = "é".repeat(DESCRIPTION_LIMIT + 20);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), DESCRIPTION_LIMIT);
        assert_eq!(truncate_description("short"), "short");
    }

    #[test]
    fn test_entries_under_accepts_array_and_wrappers() {
        assert_eq!(entries_under(&json!([1, 2]), &["items"]).unwrap().len(), 2);
        assert_eq!(
            entries_under(&json!({"relatedStreams": [1]}), &["items", "relatedStreams"])
                .unwrap()
                .len(),
            1
        );
        assert!(entries_under(&json!({"nextpage": "x"}), &["items"]).is_none());
        assert!(entries_under(&json!("text"), &["items"]).is_none());
    }

    #[test]
    fn test_normalize_entries_drops_bad_and_duplicate_ids() {
        let entries = vec![
            json!({"videoId": "a", "title": "first"}),
            json!({"type": "channel"}),
            json!({"videoId": "a", "title": "repeat"}),
            json!({"videoId": "b"}),
        ];
        let videos = normalize_entries("piped", entries, normalize_piped);
        let ids: Vec<&str> = videos.iter().map(|v| v.external_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(videos[0].title, "first");
    }
}
