//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest product scraper.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, Config};
use catalog_harvest::extract::FieldExtractor;
use catalog_harvest::output::print_statistics;
use catalog_harvest::session::FixtureSession;
use catalog_harvest::{BrowserSession, Orchestrator, ProductRecord};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Category used for records produced by `--inspect`
const INSPECT_CATEGORY: &str = "inspect";

/// Catalog-Harvest: a resilient product catalog harvester
///
/// Catalog-Harvest enters a session-gated catalog site as a guest, walks the
/// configured categories, extracts product details from every discovered
/// detail page and writes the valid records to CSV.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resilient product catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the work plan without launching a browser
    #[arg(long, conflicts_with = "inspect")]
    dry_run: bool,

    /// Extract one saved product detail page and print the record
    #[arg(long, value_name = "HTML", requires = "url")]
    inspect: Option<PathBuf>,

    /// URL the inspected page was saved from
    #[arg(long, requires = "inspect")]
    url: Option<String>,

    /// Override the maximum number of products to scrape (0 = unbounded)
    #[arg(long, value_name = "N")]
    max_products: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    apply_overrides(&mut config, &cli);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if let (Some(html), Some(url)) = (&cli.inspect, &cli.url) {
        handle_inspect(&config, html, url).await?;
    } else {
        handle_harvest(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
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

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max) = cli.max_products {
        tracing::info!("Overriding max-products: {}", max);
        config.scrape.max_products = max;
    }
    if cli.headed {
        config.browser.headless = false;
    }
}

/// Handles the --dry-run mode: shows the resolved configuration and work plan
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Location code: {}", config.site.location_code);

    println!("\nScraping:");
    match config.scrape.product_limit() {
        Some(limit) => println!("  Max products: {}", limit),
        None => println!("  Max products: unbounded"),
    }
    println!("  Throttle: {}ms", config.scrape.throttle_ms);
    println!("  Page load timeout: {}ms", config.scrape.page_load_timeout_ms);
    println!("  Element timeout: {}ms", config.scrape.element_timeout_ms);
    if config.scrape.parallel {
        println!(
            "  Parallel: work lists of up to {} products, one tab each",
            config.scrape.batch_size
        );
    } else {
        println!("  Parallel: off");
    }

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!("  Block resources: {}", config.browser.block_resources);
    println!(
        "  Window: {}x{}",
        config.browser.window_width, config.browser.window_height
    );

    println!("\nCategories ({}):", config.scrape.categories.len());
    for category in &config.scrape.categories {
        println!("  - {}", category);
    }

    println!("\nOutput:");
    println!("  CSV: {}", config.output.path().display());

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would bootstrap one session and visit {} categories",
        config.scrape.categories.len()
    );
}

/// Handles the --inspect mode: extracts fields from a saved detail page
async fn handle_inspect(config: &Config, html: &Path, url: &str) -> anyhow::Result<()> {
    let session = FixtureSession::from_html_file(url, html)
        .with_context(|| format!("Failed to read saved page {}", html.display()))?;
    session
        .goto(url, config.scrape.page_load_timeout())
        .await
        .context("Failed to open saved page")?;

    let extractor = FieldExtractor::new(
        &session,
        config.scrape.element_timeout(),
        config.scrape.page_load_timeout(),
    );
    let mut record = ProductRecord::new(url, INSPECT_CATEGORY);
    extractor.fill(&mut record).await;

    println!("=== Extracted Record ===\n");
    println!("  URL: {}", record.url);
    println!("  Brand: {}", record.brand);
    println!("  Name: {}", record.name);
    println!("  Packaging: {}", record.packaging);
    println!("  SKU: {}", record.sku);
    println!("  Image: {}", record.image_url);
    println!("  Price: {}", record.price);
    println!("  Description: {}", record.description);
    println!();

    if record.is_valid() {
        println!("✓ Record is valid and would be exported");
    } else {
        println!("✗ Record is invalid and would be skipped on export");
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: String) -> catalog_harvest::Result<()> {
    let orchestrator = Orchestrator::new(config, Some(config_hash));

    match orchestrator.run().await {
        Ok(report) => {
            print_statistics(&report.statistics);
            tracing::info!(
                "Harvest completed: {} products written to {}",
                report.statistics.records_written,
                report.output_path.display()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e)
        }
    }
}
