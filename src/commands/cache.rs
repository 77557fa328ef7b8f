//! Cache command handler: inspect cached videos for a topic.

use anyhow::Result;
use discovery_core::{TopicCache, normalize_topic};

pub async fn run_cache_show_command(cache: &TopicCache, topic: &str, limit: usize) -> Result<()> {
    let normalized = normalize_topic(topic);
    let records = cache.read(&normalized, limit.max(1)).await?;
    super::print_json(&records)
}
