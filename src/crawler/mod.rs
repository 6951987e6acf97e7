//! Category crawler
//!
//! This module turns configured category names into product detail URLs:
//! - Category selection through the products dropdown menu
//! - Paginated link collection with deduplication
//! - Detail-link filtering and absolute URL resolution

mod collector;
mod links;
mod navigator;

pub use collector::{UrlCollector, MAX_PAGES};
pub use links::{detail_url, is_detail_path, resolve_link, DETAIL_PATH_MARKERS};
pub use navigator::select_category;

use crate::selector::Resolver;
use crate::session::BrowserSession;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while crawling one category
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category '{0}' is not available in the products menu")]
    Unavailable(String),
}

/// Selects `category` and collects its product detail URLs
///
/// The listing URL reached through the menu is the entry point for
/// pagination.
///
/// # Arguments
///
/// * `resolver` - Resolver bound to the main session
/// * `base_url` - Site root used to absolutize relative links
/// * `category` - Category name as configured
/// * `page_load_timeout` - Navigation timeout for listing pages
///
/// # Returns
///
/// * `Ok(BTreeSet<String>)` - Unique detail URLs (possibly empty)
/// * `Err(CategoryError)` - The category could not be opened
pub async fn crawl_category<S: BrowserSession>(
    resolver: &Resolver<'_, S>,
    base_url: &Url,
    category: &str,
    page_load_timeout: Duration,
) -> Result<BTreeSet<String>, CategoryError> {
    select_category(resolver, category).await?;

    let entry_url = match resolver.session().current_url().await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Could not read category URL for '{}': {}", category, e);
            return Err(CategoryError::Unavailable(category.to_string()));
        }
    };
    tracing::info!("Category '{}' listing: {}", category, entry_url);

    let urls = UrlCollector::new(resolver, base_url, page_load_timeout)
        .collect_detail_urls(&entry_url)
        .await;

    Ok(urls)
}
