//! Award-Crawler main entry point
//!
//! This is the command-line interface for the award directory crawler.

use award_crawler::config::{load_config_with_hash, validate, Config};
use award_crawler::crawler::crawl;
use award_crawler::storage::{CsvStore, RecordStore};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Award-Crawler: a resumable award directory crawler
///
/// Walks countries, states, cities and companies from the directory root and
/// appends one CSV row per company. Cities already in the table are skipped,
/// so an interrupted run can simply be started again.
#[derive(Parser, Debug)]
#[command(name = "award-crawler")]
#[command(version)]
#[command(about = "A resumable award directory crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the output table path
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Override the pause after each company page, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
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
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(output) = cli.output {
        config.output.table_path = output;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.crawler.request_delay_ms = delay_ms;
    }
    validate(&config)?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("award_crawler=info,warn"),
            1 => EnvFilter::new("award_crawler=debug,info"),
            2 => EnvFilter::new("award_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration and resume state
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Award-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Delay after company page: {}ms", config.crawler.request_delay_ms);
    println!(
        "  Retries: {} ({}ms apart)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Empty cities: {:?}", config.crawler.empty_city_policy);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Table: {}", config.output.table_path);
    println!("  Empty cities: {}", config.output.empty_cities_path().display());

    println!("\nSelectors:");
    println!("  Navigation link: {}", config.selectors.navigation_link);
    println!("  Navigation label: {}", config.selectors.navigation_label);
    println!("  Business heading: {}", config.selectors.business_heading);

    println!("\nResume state:");
    let store = CsvStore::new(config.output.table_path(), config.output.empty_cities_path());
    let has_table = std::fs::metadata(store.table_path())
        .map(|m| m.len() > 0)
        .unwrap_or(false);
    if has_table {
        let rows = store.read_all()?;
        let completed = store.load_completed()?;
        let mut cities: Vec<_> = completed.iter().collect();
        cities.sort_unstable();

        println!("  {} rows already in the table", rows.len());
        println!("  {} cities will be skipped:", cities.len());
        for city in cities {
            println!("    - {}", city);
        }
    } else {
        println!("  No table yet, every city will be crawled");
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting scraper");

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Scraping completed: {} rows written, {} cities skipped",
                report.rows_written,
                report.cities_skipped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scraping failed: {}", e);
            Err(e.into())
        }
    }
}
