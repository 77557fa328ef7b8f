//! Topic normalization for cache keys and authorization comparisons.

use std::collections::BTreeSet;

use tracing::instrument;

/// Canonicalizes a topic: trims, lowercases, and collapses runs of whitespace
/// into single spaces.
///
/// An input that is blank after trimming normalizes to the empty string,
/// which callers must treat as invalid.
#[must_use]
pub fn normalize_topic(topic: &str) -> String {
    topic
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a batch of topic strings into a sorted, de-duplicated set.
///
/// Topics that normalize to the empty string are dropped.
#[must_use]
#[instrument(skip(topics))]
pub fn normalize_topics<I, S>(topics: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    topics
        .into_iter()
        .map(|topic| normalize_topic(topic.as_ref()))
        .filter(|topic| !topic.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_topic_lowercase_conversion() {
        assert_eq!(normalize_topic("Machine Learning"), "machine learning");
        assert_eq!(normalize_topic("CLIMATE CHANGE"), "climate change");
    }

    #[test]
    fn test_normalize_topic_trims_and_collapses_whitespace() {
        assert_eq!(normalize_topic("  web \t  development\n"), "web development");
        assert_eq!(normalize_topic("a    b  c"), "a b c");
    }

    #[test]
    fn test_normalize_topic_blank_is_empty() {
        assert_eq!(normalize_topic(""), "");
        assert_eq!(normalize_topic("   \t\n "), "");
    }

    #[test]
    fn test_normalize_topic_is_idempotent() {
        let samples = [
            "  Machine   Learning  ",
            "RUST",
            "",
            "\tweb\u{00A0}dev ",
            "Ünïcode Tópic",
            "already normal",
        ];
        for raw in samples {
            let once = normalize_topic(raw);
            let twice = normalize_topic(&once);
            assert_eq!(once, twice, "normalize must be idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_topics_deduplicates_and_drops_empty() {
        let set = normalize_topics(["Python", "python ", "", "  ", "Web  Development"]);
        let values: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(values, vec!["python", "web development"]);
    }
}
