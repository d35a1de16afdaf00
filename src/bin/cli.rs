//! Follow Tracker CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use follow_tracker::{
    error::{AppError, Result},
    models::{Config, HistoryEntry, User},
    pipeline::{Tracker, history_stats},
    storage::LocalStorage,
};

/// Follow Tracker - who followed and who left
#[derive(Parser, Debug)]
#[command(name = "follow-tracker", version, about = "Track GitHub followers and unfollowers")]
struct Cli {
    /// Account to track (overrides tracker.account)
    #[arg(short, long)]
    account: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "follow-tracker.toml")]
    config: PathBuf,

    /// Directory for snapshot and history files (overrides storage.data_dir)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// API token for higher rate limits (falls back to GITHUB_TOKEN)
    #[arg(short, long)]
    token: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check who followed and who unfollowed since the last run
    Check,

    /// Show follower statistics from stored history
    Stats,

    /// List accounts you follow that do not follow back
    NonMutual,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Merge command-line overrides into the file configuration.
fn resolve_config(cli: &Cli) -> Config {
    let mut config = Config::load_or_default(&cli.config);

    if let Some(account) = &cli.account {
        config.tracker.account = account.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if let Some(token) = cli.token.clone().or_else(|| std::env::var("GITHUB_TOKEN").ok()) {
        config.tracker.token = Some(token);
    }
    config
}

fn user_line(user: &User) -> String {
    format!("• {} - {}", user.login, user.profile_url)
}

fn entry_line(entry: &HistoryEntry) -> String {
    format!("• {} - {}", entry.user.login, entry.timestamp)
}

async fn run(cli: &Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Command::Check => {
            let tracker = Tracker::from_config(Arc::clone(&config))?;
            log::info!("Looking for changes for {}...", tracker.account());

            let mut report = tracker.check_changes().await?;
            if let Some(failure) = report.failure.take() {
                return Err(failure);
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            if report.gained.is_empty() {
                log::info!("No new followers this time.");
            } else {
                log::info!("New followers ({}):", report.gained.len());
                report.gained.iter().for_each(|u| log::info!("    {}", user_line(u)));
            }

            if report.lost.is_empty() {
                log::info!("Nobody unfollowed.");
            } else {
                log::info!("Unfollowers ({}):", report.lost.len());
                report.lost.iter().for_each(|u| log::info!("    {}", user_line(u)));
            }

            log::info!("Total followers: {}", report.total_followers);
        }

        Command::Stats => {
            config.validate()?;
            let storage = LocalStorage::from_config(&config.storage, config.tracker.account.clone());
            let stats = history_stats(&storage, config.storage.recent_count).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            log::info!("Follower stats for {}:", config.tracker.account);
            log::info!("    Total followers: {}", stats.total_followers);
            log::info!("    New followers ever: {}", stats.total_gained);
            log::info!("    Unfollowers ever: {}", stats.total_lost);

            if !stats.recent_gained.is_empty() {
                log::info!("Recent new followers:");
                stats.recent_gained.iter().for_each(|e| log::info!("    {}", entry_line(e)));
            }
            if !stats.recent_lost.is_empty() {
                log::info!("Recent unfollowers:");
                stats.recent_lost.iter().for_each(|e| log::info!("    {}", entry_line(e)));
            }
        }

        Command::NonMutual => {
            let tracker = Tracker::from_config(Arc::clone(&config))?;
            let mut report = tracker.non_mutual().await;
            if let Some(failure) = report.failure.take() {
                return Err(failure);
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report.users)?);
                return Ok(());
            }

            if report.users.is_empty() {
                log::info!("Everyone you follow follows back.");
            } else {
                log::info!("Not following back ({}):", report.users.len());
                report.users.iter().for_each(|u| log::info!("    {}", user_line(u)));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (tracking {})", config.tracker.account);
        }
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    init_logging(cli.verbose, &config.logging.level);

    log::debug!("Storage directory: {}", config.storage.data_dir.display());

    let config = Arc::new(config);
    tokio::select! {
        result = run(&cli, config) => result,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted");
            Err(AppError::Interrupted)
        }
    }
}
