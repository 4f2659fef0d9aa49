//! Epicollect-Sync main entry point
//!
//! This is the command-line interface for the entry synchronizer.

use anyhow::Context;
use clap::Parser;
use epicollect_sync::config::{
    load_config, load_config_from_env, validate, Config, BASE_URL_VARS, DB_PATH_VARS,
};
use epicollect_sync::storage::{SqliteStorage, Storage};
use epicollect_sync::sync::run_sync;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Epicollect-Sync: mirror survey submissions into SQLite
///
/// Fetches every entry published by the configured Epicollect5 endpoint and
/// inserts the ones not already stored, all in a single transaction. By
/// default the endpoint and database come from the `baseURL` and
/// `dbFilePath` environment variables (a `.env` file is honored).
#[derive(Parser, Debug)]
#[command(name = "epicollect-sync")]
#[command(version)]
#[command(about = "Mirror Epicollect5 entries into SQLite", long_about = None)]
struct Cli {
    /// Read configuration from a TOML file instead of the environment
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the entries endpoint URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the SQLite database path
    #[arg(long, value_name = "PATH")]
    db_path: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the resolved configuration and exit without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show the number of stored entries and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if !cli.dry_run && !cli.stats {
        return handle_sync(&config).await;
    }

    let result = if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_stats(&config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("epicollect_sync=info,warn"),
            1 => EnvFilter::new("epicollect_sync=debug,info"),
            2 => EnvFilter::new("epicollect_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the configuration from a file or the environment, then applies CLI overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let mut config = load_config(path)
                .with_context(|| format!("reading {}", path.display()))?;

            if let Some(base_url) = &cli.base_url {
                config.source.base_url = base_url.clone();
            }
            if let Some(db_path) = &cli.db_path {
                config.database.path = db_path.clone();
            }
            validate(&config)?;
            Ok(config)
        }
        None => {
            let config = load_config_from_env(|name| {
                if BASE_URL_VARS.contains(&name) {
                    cli.base_url.clone()
                } else if DB_PATH_VARS.contains(&name) {
                    cli.db_path.clone()
                } else {
                    None
                }
            })
            .context("reading configuration from the environment")?;
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: shows what a run would use
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Epicollect-Sync Dry Run ===\n");

    println!("Source:");
    println!("  Entries URL: {}", config.source.base_url);
    println!("  User agent: {}", config.http.user_agent);

    println!("\nDatabase:");
    println!("  Path: {}", config.database.path);
    println!(
        "  Exists: {}",
        if Path::new(&config.database.path).exists() {
            "yes"
        } else {
            "no (will be created)"
        }
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows the stored row count
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.database.path);

    let mut storage = SqliteStorage::open(Path::new(&config.database.path))?;
    storage.ensure_schema()?;

    let count = storage.count_entries()?;
    println!("Stored entries: {}", count);

    if let Err(e) = storage.close() {
        tracing::warn!("{}", e);
    }

    Ok(())
}

/// Handles the default mode: one fetch-and-synchronize run
///
/// The library logs the cause of any failure, so only the exit code is
/// decided here.
async fn handle_sync(config: &Config) -> ExitCode {
    tracing::info!("Fetching entries from {}", config.source.base_url);

    match run_sync(config).await {
        Ok(report) => {
            tracing::info!(
                "Run completed: {} fetched, {} inserted, {} skipped",
                report.fetched,
                report.inserted,
                report.skipped
            );
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
