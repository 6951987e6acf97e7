//! Category selection through the products menu

use crate::crawler::CategoryError;
use crate::selector::{chains, Resolver};
use crate::session::{settle, BrowserSession};
use std::time::Duration;

const SETTLE_AFTER_HOVER: Duration = Duration::from_millis(1500);
const SETTLE_AFTER_SELECT: Duration = Duration::from_secs(3);

/// Menu entries listed when a category cannot be found
const MENU_LISTING_LIMIT: usize = 10;

/// Opens the products menu and clicks the entry for `name`
///
/// The menu entry is matched by a case-insensitive "contains" test on its text.
/// On success the browser is on the category's listing page.
///
/// # Arguments
///
/// * `resolver` - Resolver bound to the main session
/// * `name` - Category name as configured
///
/// # Returns
///
/// * `Ok(())` - The category page is open
/// * `Err(CategoryError::Unavailable)` - Menu or entry missing, or the click failed
pub async fn select_category<S: BrowserSession>(
    resolver: &Resolver<'_, S>,
    name: &str,
) -> Result<(), CategoryError> {
    let session = resolver.session();
    let unavailable = || CategoryError::Unavailable(name.to_string());

    let Some(menu) = resolver.resolve(chains::PRODUCTS_MENU, None).await else {
        tracing::warn!("Products menu not found while selecting '{}'", name);
        return Err(unavailable());
    };

    if let Err(e) = session.hover(&menu.element).await {
        tracing::warn!("Could not open products menu: {}", e);
        return Err(unavailable());
    }
    settle(SETTLE_AFTER_HOVER).await;

    let Some(item) = resolver.resolve_containing(chains::MENU_ITEM, name).await else {
        tracing::warn!("Category '{}' not found in products menu", name);
        log_menu_items(resolver).await;
        return Err(unavailable());
    };

    tracing::debug!("Selecting menu entry '{}'", item.value);
    if let Err(e) = session.click(&item.element).await {
        tracing::warn!("Could not click category '{}': {}", name, e);
        return Err(unavailable());
    }
    settle(SETTLE_AFTER_SELECT).await;

    Ok(())
}

/// Logs the visible menu entries at debug level
async fn log_menu_items<S: BrowserSession>(resolver: &Resolver<'_, S>) {
    let items = resolver.resolve_all(chains::MENU_LISTING, None).await;
    if items.is_empty() {
        tracing::debug!("No menu entries visible");
        return;
    }

    tracing::debug!("Visible menu entries ({} total):", items.len());
    for (i, item) in items.iter().take(MENU_LISTING_LIMIT).enumerate() {
        tracing::debug!("  {}. {}", i + 1, item.value);
    }
}
