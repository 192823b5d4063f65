//! Rating-Harvester main entry point
//!
//! This is the command-line interface for the Rating-Harvester.

use clap::Parser;
use rating_harvester::config::{load_config_with_hash, validate, Config};
use rating_harvester::harvest::harvest;
use rating_harvester::output::log_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rating-Harvester: a paginated ratings collector
///
/// Scans catalog listing pages for identifiers, then walks each identifier's
/// paginated ratings feed until the declared total is covered.
#[derive(Parser, Debug)]
#[command(name = "rating-harvester")]
#[command(version)]
#[command(about = "A paginated ratings collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the number of listing pages to scan
    #[arg(long, value_name = "N")]
    listing_pages: Option<u32>,

    /// Validate config and show what would be harvested without any requests
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(pages) = cli.listing_pages {
        config.source.listing_pages = pages;
        if let Err(e) = validate(&config) {
            tracing::error!("Invalid configuration after --listing-pages override: {}", e);
            return Err(e.into());
        }
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rating_harvester=info,warn"),
            1 => EnvFilter::new("rating_harvester=debug,info"),
            2 => EnvFilter::new("rating_harvester=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Rating-Harvester Dry Run ===\n");

    println!("Source:");
    println!("  Listing URL: {}", config.source.listing_url_template);
    println!("  Listing pages: {}", config.source.listing_pages);
    println!("  Identifier pattern: {}", config.source.id_pattern);
    println!("  Rating URL: {}", config.source.rating_url_template);
    println!("  Page size: {}", config.source.page_size);

    println!("\nFetcher:");
    println!(
        "  Page failure policy: {:?}",
        config.fetcher.page_failure_policy
    );
    println!("  Retry attempts: {}", config.fetcher.retry_attempts);
    match config.fetcher.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: none"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting harvest: {} listing pages, page size {}",
        config.source.listing_pages,
        config.source.page_size
    );

    match harvest(config).await {
        Ok(stats) => {
            log_statistics(&stats);
            tracing::info!("Harvest completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
