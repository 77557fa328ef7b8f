//! Plan command handlers: import plans and show a user's allowed topics.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use discovery_core::{DiscoveryService, NewLearningPlan, PlanStore};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportSummary {
    imported: Vec<i64>,
    rejected: usize,
}

pub async fn run_plan_import_command(store: &PlanStore, file: &Path) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read plan file '{}'", file.display()))?;
    let plans = parse_plans(&raw)
        .with_context(|| format!("Failed to parse plan file '{}'", file.display()))?;

    let mut summary = ImportSummary {
        imported: Vec::with_capacity(plans.len()),
        rejected: 0,
    };
    for plan in &plans {
        match store.insert_plan(plan).await {
            Ok(id) => summary.imported.push(id),
            Err(error) => {
                warn!(subject = %plan.subject, error = %error, "Skipped plan");
                summary.rejected += 1;
            }
        }
    }
    info!(
        imported = summary.imported.len(),
        rejected = summary.rejected,
        "Plan import complete"
    );
    super::print_json(&summary)
}

pub async fn run_plan_topics_command(service: &DiscoveryService, user_id: &str) -> Result<()> {
    let topics = service.gate().allowed_topics(user_id).await?;
    super::print_json(&topics)
}

fn parse_plans(raw: &str) -> Result<Vec<NewLearningPlan>> {
    serde_json::from_str(raw).context("Expected a JSON array of plans")
}
