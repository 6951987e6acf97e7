use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the catalog site; relative product links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Geographic qualifier typed into the location modal (e.g. a postal code)
    #[serde(rename = "location-code")]
    pub location_code: String,
}

/// Scraping behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Category names to visit, in order
    pub categories: Vec<String>,

    /// Maximum number of product pages to extract (0 means unbounded)
    #[serde(rename = "max-products", default)]
    pub max_products: usize,

    /// Delay inserted between sequential operations (milliseconds)
    #[serde(rename = "throttle-ms", default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Page navigation timeout (milliseconds)
    #[serde(rename = "page-load-timeout-ms", default = "default_page_load_timeout_ms")]
    pub page_load_timeout_ms: u64,

    /// Element wait timeout (milliseconds)
    #[serde(rename = "element-timeout-ms", default = "default_element_timeout_ms")]
    pub element_timeout_ms: u64,

    /// Allow bounded-parallel extraction for small work lists
    #[serde(default)]
    pub parallel: bool,

    /// Largest work list extracted in parallel; also the in-flight ceiling
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run without a visible window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Block images, stylesheets, fonts, media and tracker domains
    #[serde(rename = "block-resources", default = "default_true")]
    pub block_resources: bool,

    /// User agent override; a desktop Chrome string is used when absent
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the CSV file is written into (created if missing)
    pub directory: String,

    /// CSV file name inside the output directory
    #[serde(rename = "file-name")]
    pub file_name: String,
}

impl ScrapeConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// Returns the product limit, or `None` when unbounded
    pub fn product_limit(&self) -> Option<usize> {
        if self.max_products == 0 {
            None
        } else {
            Some(self.max_products)
        }
    }
}

impl OutputConfig {
    /// Full path of the CSV file
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.file_name)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            block_resources: true,
            user_agent: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_throttle_ms() -> u64 {
    500
}

fn default_page_load_timeout_ms() -> u64 {
    30_000
}

fn default_element_timeout_ms() -> u64 {
    10_000
}

fn default_batch_size() -> usize {
    3
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}
