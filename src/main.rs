//! crawld main entry point
//!
//! This is the command-line interface for the crawld frontier crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crawld::config::load_config_with_hash;
use crawld::{Config, CrawlPipeline, CrawldError, FrontierStore, PgFrontierStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// crawld: a project-scoped crawler over a shared frontier
///
/// Any number of crawld workers can point at the same Postgres frontier
/// and split the work between them. The same binary also seeds project
/// frontiers and reports on their progress.
#[derive(Parser, Debug)]
#[command(name = "crawld")]
#[command(version)]
#[command(about = "A project-scoped crawler over a shared frontier", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(
        short,
        long,
        value_name = "CONFIG",
        default_value = "crawld.toml",
        global = true
    )]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a crawl worker until interrupted
    Crawl,

    /// Add a URL to a project's frontier
    Seed {
        /// Project the URL belongs to
        #[arg(long)]
        project: String,

        /// Absolute http(s) URL to enqueue
        #[arg(long)]
        url: String,
    },

    /// Show frontier counts and recent URLs
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Every subcommand talks to the shared store; a store that cannot be
    // reached at startup is fatal, unlike store hiccups later on.
    let store: Arc<dyn FrontierStore> = match PgFrontierStore::connect(&config.store).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to connect to the frontier store: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Crawl => handle_crawl(config, store).await,
        Command::Seed { project, url } => handle_seed(&*store, &project, &url).await,
        Command::Status => handle_status(&*store).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawld=info,warn"),
            1 => EnvFilter::new("crawld=debug,info"),
            2 => EnvFilter::new("crawld=trace,debug"),
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

/// Handles the crawl subcommand: runs the worker pipeline until interrupted
async fn handle_crawl(config: Config, store: Arc<dyn FrontierStore>) -> anyhow::Result<()> {
    let pipeline = CrawlPipeline::new(&config, store)?;
    let shutdown = pipeline.shutdown_token();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received; finishing in-flight work");
                shutdown.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for interrupt: {}", e),
        }
    });

    let summary = pipeline.run().await?;
    tracing::info!(
        "Crawl stopped: {} pages fetched, {} failures, {} new URLs discovered",
        summary.pages_fetched,
        summary.fetch_failures,
        summary.discovered_inserted
    );

    Ok(())
}

/// Handles the seed subcommand: enqueues one URL for a project
async fn handle_seed(store: &dyn FrontierStore, project: &str, url: &str) -> anyhow::Result<()> {
    if project.trim().is_empty() {
        anyhow::bail!("project must not be empty");
    }

    let parsed = Url::parse(url).with_context(|| format!("invalid seed URL: {url}"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CrawldError::UnsupportedScheme {
            scheme: parsed.scheme().to_string(),
            url: url.to_string(),
        }
        .into());
    }

    // Insert the parsed form, not the raw argument, so the stored text is
    // the same one the pipeline will later mark completed.
    let inserted = store.insert_discovered(project, parsed.as_str()).await?;
    if inserted {
        println!("Seeded [{}] {}", project, parsed);
    } else {
        println!("Already present: [{}] {}", project, parsed);
    }

    Ok(())
}

/// Handles the status subcommand: prints frontier counts and recent URLs
async fn handle_status(store: &dyn FrontierStore) -> anyhow::Result<()> {
    crawld::monitor::show_status(store).await?;
    Ok(())
}
