//! sitewatch CLI
//!
//! Local entry point for managing watched sitemaps and running checks.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sitewatch::{
    error::{AppError, Result},
    models::{CheckOutcome, Config, Feed},
    pipeline,
    services::{LogNotifier, SitemapWatcher, dispatch},
};

/// sitewatch - Sitemap change watcher
#[derive(Parser, Debug)]
#[command(name = "sitewatch", version, about = "Reports new URLs in watched sitemaps")]
struct Cli {
    /// Path to storage directory (registry, snapshots, config.toml)
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Configuration file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List watched sitemaps
    List,

    /// Watch a sitemap and take its first snapshot
    Add {
        /// Sitemap URL
        url: String,
    },

    /// Stop watching a sitemap (snapshots are kept)
    Remove {
        /// Sitemap URL
        url: String,
    },

    /// Check one sitemap, or every watched sitemap when omitted
    Check {
        /// Sitemap URL
        url: Option<String>,
    },

    /// Print every leaf URL reachable from a sitemap or sitemap index
    Resolve {
        /// Sitemap URL
        url: String,
    },

    /// Register configured domains, then check all sitemaps
    Pipeline,

    /// Validate configuration
    Validate,

    /// Show snapshot state of every watched sitemap
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn report(outcome: &CheckOutcome) {
    if outcome.success {
        log::info!("{}", outcome.message);
    } else {
        log::error!("{}", outcome.message);
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));
    let config = Config::load_or_default(&config_path);

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK ({} configured domains)", config.watch.domains.len());
        return Ok(());
    }

    let watcher = SitemapWatcher::open(&cli.storage_dir, &config).await?;
    let notifier = LogNotifier;

    match cli.command {
        Command::List => {
            let feeds = watcher.list_feeds().await;
            if feeds.is_empty() {
                log::info!("No sitemaps are being watched.");
            }
            for (i, url) in feeds.iter().enumerate() {
                println!("{:>3}. {}", i + 1, url);
            }
        }

        Command::Add { url } => {
            let outcome = watcher.add_feed(&url).await;
            report(&outcome);
            if !outcome.success {
                return Err(AppError::Rejected(outcome.message));
            }
            dispatch(&Feed::parse(&url)?, &outcome, &notifier).await?;
        }

        Command::Remove { url } => {
            let reply = watcher.remove_feed(&url).await;
            if !reply.success {
                log::error!("{}", reply.message);
                return Err(AppError::Rejected(reply.message));
            }
            log::info!("{}", reply.message);
        }

        Command::Check { url: Some(url) } => {
            let outcome = watcher.check(&url).await;
            report(&outcome);
            if !outcome.success {
                return Err(AppError::Rejected(outcome.message));
            }
            dispatch(&Feed::parse(&url)?, &outcome, &notifier).await?;
        }

        Command::Check { url: None } => {
            pipeline::run_checks(&watcher, &notifier).await.report();
        }

        Command::Resolve { url } => {
            let urls = watcher.resolve_all_urls(&url).await?;
            for u in &urls {
                println!("{u}");
            }
            log::info!("{} URLs in total", urls.len());
        }

        Command::Pipeline => {
            config.validate()?;
            pipeline::run_pipeline(&watcher, &config.watch.domains, &notifier)
                .await?
                .report();
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            for url in watcher.list_feeds().await {
                let feed = Feed::parse(&url)?;
                let snapshot = watcher.scheduler().store().read(&feed).await?;
                let last_update = snapshot
                    .last_update
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "never".to_string());
                let archive = match &snapshot.archive {
                    Some(a) => format!("pending archive {}", a.date),
                    None => "no pending archive".to_string(),
                };
                println!("{url}\n    last update: {last_update}, {archive}");
            }
        }

        // Handled before storage is opened.
        Command::Validate => {}
    }

    Ok(())
}
