//! CLI entry point for the topic discovery tool.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use discovery_core::{Database, DiscoveryError, DiscoveryService, PlanStore};
use tracing::{debug, error};

mod app_config;
mod cli;
mod commands;

use app_config::{FileConfig, VerbositySetting};
use cli::{CacheCommand, Cli, Command, PlanCommand};

/// Process outcome mapped to an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
    /// The request was rejected: blank input or a topic outside the plans.
    Rejected,
    /// No provider answered and nothing was cached.
    Unavailable,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Rejected => 2,
            Self::Unavailable => 3,
        }
    }

    fn from_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<DiscoveryError>() {
            Some(DiscoveryError::BadRequest { .. } | DiscoveryError::Forbidden) => Self::Rejected,
            Some(DiscoveryError::Unavailable { .. }) => Self::Unavailable,
            None => Self::Failure,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let file_config = match app_config::load_default_file_config() {
        Ok(config) => config,
        Err(error) => {
            init_tracing(&cli, None);
            error!("{error:#}");
            return ExitCode::from(ProcessExit::Failure.code());
        }
    };
    init_tracing(&cli, file_config.verbosity);
    debug!(?cli, "CLI arguments parsed");

    let exit = match run(&cli, &file_config).await {
        Ok(()) => ProcessExit::Success,
        Err(error) => {
            let exit = ProcessExit::from_error(&error);
            match error.downcast_ref::<DiscoveryError>() {
                Some(discovery) => {
                    debug!(detail = %discovery, "Request failed");
                    eprintln!("{}", discovery.user_message());
                }
                None => error!("{error:#}"),
            }
            exit
        }
    };
    ExitCode::from(exit.code())
}

/// Log level priority: `RUST_LOG` > `-q` > `-v` count > config file > info.
fn default_log_level(cli: &Cli, file_verbosity: Option<VerbositySetting>) -> &'static str {
    if cli.quiet {
        return "error";
    }
    match cli.verbose {
        0 => file_verbosity.map_or("info", VerbositySetting::log_level),
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(cli: &Cli, file_verbosity: Option<VerbositySetting>) {
    let default_level = default_log_level(cli, file_verbosity);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

async fn run(cli: &Cli, file_config: &FileConfig) -> Result<()> {
    let config = app_config::build_discovery_config(
        file_config,
        app_config::api_key_from_env(),
        cli.deadline,
    )?;
    debug!(?config, "Effective configuration");

    let db_path = cli
        .db
        .clone()
        .or_else(|| file_config.database_path.clone())
        .unwrap_or_else(|| PathBuf::from(app_config::DEFAULT_DATABASE_FILE));
    let db = Database::new(&db_path)
        .await
        .with_context(|| format!("Failed to open database '{}'", db_path.display()))?;
    debug!(path = %db_path.display(), "Database ready");

    let store = PlanStore::new(db.clone());
    let service = DiscoveryService::from_config(&config, db.clone(), Arc::new(store.clone()));

    let outcome = match &cli.command {
        Command::Search(args) => commands::run_search_command(&service, args).await,
        Command::Suggest(args) => commands::run_suggest_command(&service, args).await,
        Command::Plan { command } => match command {
            PlanCommand::Import { file } => commands::run_plan_import_command(&store, file).await,
            PlanCommand::Topics { user } => commands::run_plan_topics_command(&service, user).await,
        },
        Command::Cache { command } => match command {
            CacheCommand::Show { topic, limit } => {
                commands::run_cache_show_command(service.cache(), topic, *limit).await
            }
        },
    };

    db.close().await;
    outcome
}
