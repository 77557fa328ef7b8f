//! Keyword relevance filter.
//!
//! A video is relevant when its lowercased title + description contains at
//! least one topic token (length >= 2) as a substring. A topic with no usable
//! tokens carries no signal, so every video passes.

use tracing::debug;

use super::VideoItem;

/// Tokens shorter than this many characters are ignored.
const MIN_TOKEN_CHARS: usize = 2;

/// Splits a topic into lowercase whitespace tokens of at least two characters.
#[must_use]
pub fn topic_tokens(topic: &str) -> Vec<String> {
    topic
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Returns true if `video` mentions any token of `topic`.
#[must_use]
pub fn is_relevant(video: &VideoItem, topic: &str) -> bool {
    matches_tokens(video, &topic_tokens(topic))
}

/// Keeps only the relevant videos, preserving provider order.
#[must_use]
pub fn filter_relevant(videos: Vec<VideoItem>, topic: &str) -> Vec<VideoItem> {
    let tokens = topic_tokens(topic);
    let before = videos.len();
    let kept: Vec<VideoItem> = videos
        .into_iter()
        .filter(|video| matches_tokens(video, &tokens))
        .collect();
    debug!(
        before,
        after = kept.len(),
        tokens = tokens.len(),
        "Applied relevance filter"
    );
    kept
}

fn matches_tokens(video: &VideoItem, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let haystack = format!("{} {}", video.title, video.description).to_lowercase();
    tokens.iter().any(|token| haystack.contains(token.as_str()))
}
