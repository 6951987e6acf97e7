use crate::config::types::{Config, OutputConfig, ScrapeConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Smallest accepted page-load or element timeout
const MIN_TIMEOUT_MS: u64 = 100;

/// Largest accepted parallel batch
const MAX_BATCH_SIZE: usize = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_scrape_config(&config.scrape)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.location_code.trim().is_empty() {
        return Err(ConfigError::Validation(
            "location_code cannot be empty".to_string(),
        ));
    }

    if !config
        .location_code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(ConfigError::Validation(format!(
            "location_code must be alphanumeric, got '{}'",
            config.location_code
        )));
    }

    Ok(())
}

/// Validates scraping behavior configuration
fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    if config.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category must be configured".to_string(),
        ));
    }

    if let Some(blank) = config.categories.iter().position(|c| c.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "category #{} is empty",
            blank + 1
        )));
    }

    if config.page_load_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "page_load_timeout_ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.page_load_timeout_ms
        )));
    }

    if config.element_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "element_timeout_ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.element_timeout_ms
        )));
    }

    if config.batch_size < 1 || config.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, config.batch_size
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_name.is_empty() {
        return Err(ConfigError::Validation(
            "output file_name cannot be empty".to_string(),
        ));
    }

    if config.file_name.contains('/') || config.file_name.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "output file_name must not contain path separators, got '{}'",
            config.file_name
        )));
    }

    Ok(())
}
