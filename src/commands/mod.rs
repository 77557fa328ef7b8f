//! CLI command handlers.
//!
//! Each handler prints its result as pretty JSON on stdout. Logs go to
//! stderr, so stdout stays machine-readable.

mod cache;
mod plan;
mod search;
mod suggest;

pub use cache::run_cache_show_command;
pub use plan::{run_plan_import_command, run_plan_topics_command};
pub use search::run_search_command;
pub use suggest::run_suggest_command;

use anyhow::{Context, Result};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}
