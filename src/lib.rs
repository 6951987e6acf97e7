//! Catalog-Harvest: a resilient product catalog harvester
//!
//! This crate drives a JavaScript-rendered, session-gated catalog site through a
//! browser session, discovers product detail pages category by category, extracts
//! structured product records with per-field fallback selector chains, and writes
//! the valid records to a CSV file.

pub mod bootstrap;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod orchestrator;
pub mod output;
pub mod record;
pub mod selector;
pub mod session;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
///
/// Only failures that end a run surface as this type. Misses, page failures,
/// unavailable categories and per-item failures are recovered closer to where
/// they happen.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Driver(#[from] session::DriverError),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("No product URLs were collected from any category")]
    NoProductUrls,

    #[error("Run interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use bootstrap::BootstrapState;
pub use config::Config;
pub use orchestrator::{Orchestrator, RunReport};
pub use record::{CategoryUrlMap, ProductRecord, WorkItem};
pub use selector::{Locator, SelectorChain};
pub use session::BrowserSession;
