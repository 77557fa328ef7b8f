//! Suggest command handler: plan-scoped, cached topic suggestions.

use anyhow::Result;
use discovery_core::DiscoveryService;
use tracing::info;

use crate::cli::SuggestArgs;

pub async fn run_suggest_command(service: &DiscoveryService, args: &SuggestArgs) -> Result<()> {
    let suggestions = service
        .get_suggestions(&args.user, &args.topic, args.max_results)
        .await?;
    info!(
        topic = %suggestions.topic,
        count = suggestions.videos.len(),
        from_cache = suggestions.from_cache,
        "Suggestions ready"
    );
    super::print_json(&suggestions)
}
