//! Search command handler: raw provider search without plan or cache.

use anyhow::{Result, anyhow};
use discovery_core::{DiscoveryService, DurationBucket, SearchOptions, SearchOrder};
use tracing::info;

use crate::cli::SearchArgs;

pub async fn run_search_command(service: &DiscoveryService, args: &SearchArgs) -> Result<()> {
    let opts = search_options(args)?;
    let videos = service.search_videos(&args.query, &opts).await?;
    info!(count = videos.len(), "Search complete");
    super::print_json(&videos)
}

fn search_options(args: &SearchArgs) -> Result<SearchOptions> {
    let order: SearchOrder = args.order.parse().map_err(|e: String| anyhow!(e))?;
    let duration: DurationBucket = args.duration.parse().map_err(|e: String| anyhow!(e))?;
    Ok(SearchOptions {
        max_results: args.max_results,
        channel_id: args
            .channel
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        order,
        duration,
    })
}
