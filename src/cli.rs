//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use discovery_core::provider::DEFAULT_MAX_RESULTS;

/// Find short educational videos for the topics in a learning plan.
///
/// Searches the official video API when a credential is configured and falls
/// back to public mirror front-ends. Results are cached per topic.
#[derive(Parser, Debug)]
#[command(name = "topic-discovery")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// SQLite database holding plans and the topic cache
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Overall time budget in seconds for one provider fallback chain (1-600)
    #[arg(long, value_name = "SECS", global = true, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub deadline: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Raw video search across providers (no plan check, no cache)
    Search(SearchArgs),
    /// Suggestions for one topic of a user's active learning plans
    Suggest(SuggestArgs),
    /// Manage learning plans
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// Inspect the topic cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-text search query
    pub query: String,

    /// Maximum number of videos to return
    #[arg(short = 'n', long = "max", default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Only return videos from this channel (official tier only)
    #[arg(long)]
    pub channel: Option<String>,

    /// Result order: relevance, date, rating, viewCount
    #[arg(long, default_value = "relevance")]
    pub order: String,

    /// Duration bucket: any, short, medium, long
    #[arg(long, default_value = "any")]
    pub duration: String,
}

#[derive(Args, Debug, Clone)]
pub struct SuggestArgs {
    /// User whose learning plans authorize the topic
    #[arg(long)]
    pub user: String,

    /// Topic to find videos for
    pub topic: String,

    /// Maximum number of videos to return
    #[arg(short = 'n', long = "max", default_value_t = 10)]
    pub max_results: usize,
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Import learning plans from a JSON file
    Import {
        /// JSON array of plans: {userId, subject, status?, modules}
        file: PathBuf,
    },
    /// Print the topics a user may request
    Topics {
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Print cached videos for a topic, newest first
    Show {
        topic: String,

        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
        limit: usize,
    },
}
