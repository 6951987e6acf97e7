//! Work-list dispatch
//!
//! Small work lists may be extracted in parallel, one browser tab per item;
//! everything else runs sequentially on the main tab with a throttle between
//! items. In both modes an item that fails or yields an invalid record is
//! dropped without affecting the others.

use crate::config::ScrapeConfig;
use crate::extract::FieldExtractor;
use crate::record::{ProductRecord, WorkItem};
use crate::session::{settle, BrowserSession};
use futures::future::join_all;
use std::fmt;
use tokio::sync::Semaphore;
use tokio::time::{Duration, Instant};

/// Characters of the product name shown in progress lines
const PREVIEW_CHARS: usize = 50;

/// How a work list is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Sequential,
    Parallel,
}

impl DispatchMode {
    /// Parallel only when enabled and the whole list fits in one batch
    pub fn choose(config: &ScrapeConfig, items: usize) -> Self {
        if config.parallel && items <= config.batch_size {
            Self::Parallel
        } else {
            Self::Sequential
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Parallel => f.write_str("parallel"),
        }
    }
}

/// Extracts every work item and returns the valid records
///
/// # Arguments
///
/// * `session` - Main browser tab; parallel mode opens extra tabs from it
/// * `config` - Timeouts, throttle and batch size
/// * `items` - Flattened, truncated work list
/// * `mode` - Execution mode chosen with [`DispatchMode::choose`]
pub async fn dispatch<S: BrowserSession>(
    session: &S,
    config: &ScrapeConfig,
    items: &[WorkItem],
    mode: DispatchMode,
) -> Vec<ProductRecord> {
    tracing::info!("Scraping {} products ({} mode)", items.len(), mode);

    let records = match mode {
        DispatchMode::Sequential => dispatch_sequential(session, config, items).await,
        DispatchMode::Parallel => dispatch_parallel(session, config, items).await,
    };

    tracing::info!("Scraped {} valid products", records.len());
    records
}

async fn dispatch_sequential<S: BrowserSession>(
    session: &S,
    config: &ScrapeConfig,
    items: &[WorkItem],
) -> Vec<ProductRecord> {
    let extractor = FieldExtractor::new(
        session,
        config.element_timeout(),
        config.page_load_timeout(),
    );
    let total = items.len();
    let mut records = Vec::new();

    for (index, item) in items.iter().enumerate() {
        tracing::debug!(
            "[{}/{}] Scraping '{}': {}",
            index + 1,
            total,
            item.category,
            item.url
        );
        let started = Instant::now();
        let record = extractor.extract(&item.url, &item.category).await;
        if let Some(record) = keep_valid(index, total, record, started.elapsed()) {
            records.push(record);
        }

        settle(config.throttle()).await;
    }

    records
}

async fn dispatch_parallel<S: BrowserSession>(
    session: &S,
    config: &ScrapeConfig,
    items: &[WorkItem],
) -> Vec<ProductRecord> {
    let semaphore = Semaphore::new(config.batch_size.max(1));
    let total = items.len();
    let started = Instant::now();

    let tasks = items.iter().enumerate().map(|(index, item)| {
        let semaphore = &semaphore;
        async move {
            let _permit = semaphore.acquire().await.ok()?;
            extract_in_new_tab(session, config, index, total, item).await
        }
    });

    let records: Vec<ProductRecord> = join_all(tasks).await.into_iter().flatten().collect();

    let elapsed = started.elapsed().as_secs_f64();
    tracing::info!(
        "Parallel scraping finished in {:.2}s (avg {:.2}s per product)",
        elapsed,
        elapsed / total.max(1) as f64
    );
    records
}

/// Extracts one item in its own tab, closing the tab afterwards
async fn extract_in_new_tab<S: BrowserSession>(
    session: &S,
    config: &ScrapeConfig,
    index: usize,
    total: usize,
    item: &WorkItem,
) -> Option<ProductRecord> {
    let started = Instant::now();
    tracing::debug!("[{}/{}] Starting: {}", index + 1, total, item.url);

    let tab = match session.open_tab().await {
        Ok(tab) => tab,
        Err(e) => {
            tracing::warn!("[{}/{}] Could not open tab: {}", index + 1, total, e);
            return None;
        }
    };

    let record = {
        let extractor =
            FieldExtractor::new(&tab, config.element_timeout(), config.page_load_timeout());
        extractor.extract(&item.url, &item.category).await
    };

    if let Err(e) = tab.close().await {
        tracing::debug!("[{}/{}] Could not close tab: {}", index + 1, total, e);
    }

    keep_valid(index, total, record, started.elapsed())
}

/// Logs the outcome of one item and keeps it only if valid
fn keep_valid(
    index: usize,
    total: usize,
    record: ProductRecord,
    elapsed: Duration,
) -> Option<ProductRecord> {
    if record.is_valid() {
        tracing::info!(
            "[{}/{}] Scraped in {:.2}s: {}",
            index + 1,
            total,
            elapsed.as_secs_f64(),
            record.preview(PREVIEW_CHARS)
        );
        Some(record)
    } else {
        tracing::warn!(
            "[{}/{}] Skipped invalid product (took {:.2}s): {}",
            index + 1,
            total,
            elapsed.as_secs_f64(),
            record.url
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::session::FixtureSession;

    fn scrape_config(parallel: bool, batch_size: usize) -> ScrapeConfig {
        parse_config(&format!(
            r#"
[site]
base-url = "https://shop.example.com"
location-code = "97035"

[scrape]
categories = ["Dairy"]
throttle-ms = 500
page-load-timeout-ms = 5000
element-timeout-ms = 1000
parallel = {}
batch-size = {}

[output]
directory = "out"
file-name = "products.csv"
"#,
            parallel, batch_size
        ))
        .unwrap()
        .scrape
    }

    fn item(n: usize) -> WorkItem {
        WorkItem {
            category: "Dairy".to_string(),
            url: format!("https://shop.example.com/app/product-details/{}", n),
        }
    }

    fn session_with(items: &[WorkItem], delay: Duration) -> FixtureSession {
        let mut builder = FixtureSession::builder();
        for (n, item) in items.iter().enumerate() {
            builder = builder.slow_page(
                item.url.clone(),
                format!("<h1 class=\"product-name\">Product {}</h1>", n),
                delay,
            );
        }
        builder.build()
    }

    #[test]
    fn test_choose_mode() {
        assert_eq!(
            DispatchMode::choose(&scrape_config(true, 3), 3),
            DispatchMode::Parallel
        );
        assert_eq!(
            DispatchMode::choose(&scrape_config(true, 3), 4),
            DispatchMode::Sequential
        );
        assert_eq!(
            DispatchMode::choose(&scrape_config(false, 3), 1),
            DispatchMode::Sequential
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_throttles_between_items() {
        let config = scrape_config(false, 3);
        let items: Vec<WorkItem> = (0..3).map(item).collect();
        let session = session_with(&items, Duration::from_secs(1));

        let start = Instant::now();
        let records = dispatch(&session, &config, &items, DispatchMode::Sequential).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Product 0");
        // Per item: 1s load, 3s settle, 0.5s throttle
        assert_eq!(start.elapsed(), Duration::from_millis(13_500));
        assert_eq!(session.tabs_opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_runs_items_concurrently() {
        let config = scrape_config(true, 3);
        let items: Vec<WorkItem> = (0..3).map(item).collect();
        let session = session_with(&items, Duration::from_secs(1));

        let start = Instant::now();
        let records = dispatch(&session, &config, &items, DispatchMode::Parallel).await;

        assert_eq!(records.len(), 3);
        assert_eq!(session.tabs_opened(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_items_are_dropped() {
        let config = scrape_config(true, 3);
        let items: Vec<WorkItem> = (0..3).map(item).collect();
        // Only the first item has a page; the second has no identifying fields
        let session = FixtureSession::builder()
            .page(items[0].url.clone(), "<div class=\"sku\">111</div>")
            .page(items[1].url.clone(), "<p>empty</p>")
            .build();

        for mode in [DispatchMode::Sequential, DispatchMode::Parallel] {
            let records = dispatch(&session, &config, &items, mode).await;
            assert_eq!(records.len(), 1, "{} mode", mode);
            assert_eq!(records[0].sku, "111");
        }
    }
}
