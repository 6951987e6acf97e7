//! Run orchestration
//!
//! This module contains the main harvest flow that coordinates every phase of
//! a run:
//! - Launching the browser and bootstrapping the session once
//! - Crawling each configured category for product URLs
//! - Dispatching the work list sequentially or in bounded parallel
//! - Exporting the valid records and timing each phase

mod dispatch;

pub use dispatch::{dispatch, DispatchMode};

use crate::bootstrap::{bootstrap, BootstrapState};
use crate::config::Config;
use crate::crawler::crawl_category;
use crate::output::{export_products, Phase, RunStatistics};
use crate::record::{CategoryUrlMap, ProductRecord};
use crate::selector::Resolver;
use crate::session::{settle, BrowserSession, ChromiumSession};
use crate::{ConfigError, HarvestError, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Pause after leaving one category before selecting the next
const CATEGORY_SETTLE: Duration = Duration::from_secs(1);

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Terminal bootstrap state; a failed bootstrap does not stop the run
    pub bootstrap: BootstrapState,

    /// How the work list was executed
    pub mode: DispatchMode,

    /// Valid records, in completion order
    pub records: Vec<ProductRecord>,

    pub statistics: RunStatistics,

    /// CSV file the records were written to
    pub output_path: PathBuf,
}

/// Main harvest orchestrator
pub struct Orchestrator {
    config: Config,
    config_hash: Option<String>,
}

impl Orchestrator {
    /// Creates a new orchestrator for an already validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `config_hash` - Hash of the configuration file, logged with the banner
    pub fn new(config: Config, config_hash: Option<String>) -> Self {
        Self {
            config,
            config_hash,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Launches a browser and runs a full harvest with it
    ///
    /// The browser is shut down whether the run succeeds, fails or is
    /// interrupted with Ctrl-C.
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - Records were exported
    /// * `Err(HarvestError)` - Launch, configuration, collection or export failed
    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        tracing::info!("Launching browser...");
        let session = ChromiumSession::launch(&self.config.browser).await?;
        let startup = started.elapsed();

        let result = tokio::select! {
            result = self.run_with_session(&session, startup) => result,
            _ = until_interrupt(tokio::signal::ctrl_c()) => {
                tracing::warn!("Interrupt received, shutting down browser");
                Err(HarvestError::Interrupted)
            }
        };

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }

        result
    }

    /// Runs a harvest on an existing session
    ///
    /// This is everything [`Orchestrator::run`] does after the browser is up.
    ///
    /// # Arguments
    ///
    /// * `session` - Main browser tab
    /// * `browser_startup` - Time already spent launching the browser
    pub async fn run_with_session<S: BrowserSession>(
        &self,
        session: &S,
        browser_startup: Duration,
    ) -> Result<RunReport> {
        let started_at = Utc::now();
        let started = Instant::now();
        self.log_banner();

        let mut stats = RunStatistics::new();
        stats.categories_requested = self.config.scrape.categories.len();
        stats.timings.record(Phase::BrowserStartup, browser_startup);

        // Session setup
        let phase = Instant::now();
        let bootstrap_state = bootstrap(session, &self.config).await;
        if !bootstrap_state.is_ready() {
            tracing::warn!(
                "Session bootstrap ended in {}, continuing anyway",
                bootstrap_state
            );
        }
        stats.timings.record(Phase::SessionSetup, phase.elapsed());

        // URL collection
        let phase = Instant::now();
        let url_map = self.collect_urls(session).await?;
        stats.timings.record(Phase::UrlCollection, phase.elapsed());

        if url_map.is_empty() {
            tracing::error!("No product URLs found in any category");
            return Err(HarvestError::NoProductUrls);
        }
        stats.categories_collected = url_map.category_count();
        stats.urls_discovered = url_map.url_count();
        tracing::info!(
            "Collected {} product URLs across {} categories",
            stats.urls_discovered,
            stats.categories_collected
        );

        let work = url_map.into_work_list(self.config.scrape.product_limit());
        stats.items_dispatched = work.len();
        if let Some(limit) = self.config.scrape.product_limit() {
            tracing::info!("Limited to {} products (max-products = {})", work.len(), limit);
        }

        // Product scraping
        let phase = Instant::now();
        let mode = DispatchMode::choose(&self.config.scrape, work.len());
        let records = dispatch(session, &self.config.scrape, &work, mode).await;
        stats.records_valid = records.len();
        stats.timings.record(Phase::ProductScraping, phase.elapsed());

        // Export
        let phase = Instant::now();
        let output_path = self.config.output.path();
        let written = export_products(&records, &output_path)?;
        stats.records_written = written;
        stats.timings.record(Phase::Export, phase.elapsed());

        stats.total_elapsed = browser_startup + started.elapsed();

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            bootstrap: bootstrap_state,
            mode,
            records,
            statistics: stats,
            output_path,
        })
    }

    /// Crawls every configured category in order
    async fn collect_urls<S: BrowserSession>(&self, session: &S) -> Result<CategoryUrlMap> {
        let scrape = &self.config.scrape;
        let base_url = Url::parse(&self.config.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
        let resolver = Resolver::new(session, scrape.element_timeout());

        let mut url_map = CategoryUrlMap::new();
        let total = scrape.categories.len();

        for (index, category) in scrape.categories.iter().enumerate() {
            tracing::info!("Processing category {}/{}: {}", index + 1, total, category);

            match crawl_category(&resolver, &base_url, category, scrape.page_load_timeout()).await
            {
                Ok(urls) if urls.is_empty() => {
                    tracing::warn!("No product URLs found for '{}'", category);
                }
                Ok(urls) => {
                    tracing::info!("Found {} products in '{}'", urls.len(), category);
                    url_map.insert(category, urls);
                }
                Err(e) => {
                    tracing::warn!("Skipping category: {}", e);
                }
            }

            if index + 1 < total {
                settle(CATEGORY_SETTLE).await;
            }
            settle(scrape.throttle()).await;
        }

        Ok(url_map)
    }

    fn log_banner(&self) {
        let config = &self.config;
        tracing::info!("Starting harvest of {}", config.site.base_url);
        if let Some(hash) = &self.config_hash {
            tracing::info!("Config hash: {}", hash);
        }
        tracing::info!("Location code: {}", config.site.location_code);
        tracing::info!("Headless: {}", config.browser.headless);
        tracing::info!("Categories: {}", config.scrape.categories.join(", "));
        match config.scrape.product_limit() {
            Some(limit) => tracing::info!("Max products: {}", limit),
            None => tracing::info!("Max products: unbounded"),
        }
        tracing::info!("Output: {}", config.output.path().display());
    }
}

/// Resolves once `signal` reports an interrupt
///
/// If the signal listener cannot be installed the error is logged and this
/// never resolves, so the run continues uninterrupted.
async fn until_interrupt<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
