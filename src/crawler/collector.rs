//! Paginated product URL collection for one category listing

use crate::crawler::links::detail_url;
use crate::selector::{chains, Resolver};
use crate::session::{bounded, settle, BrowserSession};
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

/// Upper bound on listing pages visited per category
pub const MAX_PAGES: usize = 10;

const SETTLE_BEFORE_SCROLL: Duration = Duration::from_secs(1);
const SETTLE_AFTER_SCROLL: Duration = Duration::from_secs(1);
const SETTLE_AFTER_NEXT: Duration = Duration::from_secs(3);

/// Anchors shown by the empty-page diagnostic
const DIAGNOSTIC_HREF_LIMIT: usize = 10;

/// Collects product detail URLs from a category listing
pub struct UrlCollector<'r, 's, S: BrowserSession> {
    resolver: &'r Resolver<'s, S>,
    base_url: &'r Url,
    page_load_timeout: Duration,
}

impl<'r, 's, S: BrowserSession> UrlCollector<'r, 's, S> {
    pub fn new(
        resolver: &'r Resolver<'s, S>,
        base_url: &'r Url,
        page_load_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            base_url,
            page_load_timeout,
        }
    }

    /// Walks the listing starting at `entry_url` and returns every unique detail URL
    ///
    /// At most [`MAX_PAGES`] pages are visited. Pagination stops early when the
    /// next-page control is missing, disabled or cannot be clicked. A failed
    /// initial navigation yields an empty set.
    pub async fn collect_detail_urls(&self, entry_url: &str) -> BTreeSet<String> {
        let session = self.resolver.session();
        let mut urls = BTreeSet::new();

        if let Err(e) = session.goto(entry_url, self.page_load_timeout).await {
            tracing::warn!("Failed to load category page {}: {}", entry_url, e);
            return urls;
        }

        for page in 1..=MAX_PAGES {
            settle(SETTLE_BEFORE_SCROLL).await;
            if let Err(e) = session.scroll_to_bottom().await {
                tracing::debug!("Scroll failed on page {}: {}", page, e);
            }
            settle(SETTLE_AFTER_SCROLL).await;

            let found = self.page_links().await;
            if page == 1 && found.is_empty() {
                self.log_empty_page().await;
            }

            let before = urls.len();
            urls.extend(found);
            tracing::info!(
                "Page {}: {} new product URLs ({} total)",
                page,
                urls.len() - before,
                urls.len()
            );

            if page == MAX_PAGES {
                tracing::debug!("Reached page limit of {}", MAX_PAGES);
                break;
            }
            if !self.advance().await {
                break;
            }
        }

        urls
    }

    /// Detail URLs linked from the current page
    async fn page_links(&self) -> BTreeSet<String> {
        self.resolver
            .resolve_union(chains::PRODUCT_LINK, None)
            .await
            .into_iter()
            .filter_map(|link| detail_url(&link.value, self.base_url))
            .collect()
    }

    /// Clicks the next-page control; returns false when there is no next page
    async fn advance(&self) -> bool {
        let session = self.resolver.session();

        let Some(next) = self.resolver.resolve(chains::NEXT_PAGE, None).await else {
            tracing::debug!("No next page control");
            return false;
        };

        match session.attribute(&next.element, "disabled").await {
            Ok(Some(_)) => {
                tracing::debug!("Next page control is disabled");
                return false;
            }
            Ok(None) => {}
            Err(e) => tracing::trace!("Could not read next control state: {}", e),
        }

        if let Err(e) = session.click(&next.element).await {
            tracing::warn!("Could not go to next page: {}", e);
            return false;
        }
        settle(SETTLE_AFTER_NEXT).await;
        true
    }

    /// Logs what the page does contain when no product links were found
    async fn log_empty_page(&self) {
        let session = self.resolver.session();
        tracing::warn!("No product links found on first listing page");

        let title = session.title().await.unwrap_or_default();
        tracing::debug!("Page title: {}", title);

        let anchors = match bounded(
            self.resolver.element_timeout(),
            "anchors",
            session.query_all(None, "a"),
        )
        .await
        {
            Ok(anchors) => anchors,
            Err(e) => {
                tracing::debug!("Could not list anchors: {}", e);
                return;
            }
        };
        tracing::debug!("Total anchors on page: {}", anchors.len());

        for (i, anchor) in anchors.iter().take(DIAGNOSTIC_HREF_LIMIT).enumerate() {
            let href = session
                .attribute(anchor, "href")
                .await
                .ok()
                .flatten()
                .unwrap_or_default();
            tracing::debug!("  {}. {}", i + 1, href);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FixtureSession;

    const PAGE_1: &str = "https://shop.example.com/app/catalog/meat?page=1";
    const PAGE_2: &str = "https://shop.example.com/app/catalog/meat?page=2";

    fn base() -> Url {
        Url::parse("https://shop.example.com/").unwrap()
    }

    fn collector_for<'r, 's>(
        resolver: &'r Resolver<'s, FixtureSession>,
        base: &'r Url,
    ) -> UrlCollector<'r, 's, FixtureSession> {
        UrlCollector::new(resolver, base, Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_dedups_across_pages() {
        let session = FixtureSession::builder()
            .page(
                PAGE_1,
                format!(
                    r#"<a class="product-card-link" href="/app/product-details/1">One</a>
                    <a class="product-card-link" href="/app/product-details/2">Two</a>
                    <a href="/app/cart">Cart</a>
                    <a data-fixture-goto="{}">Next</a>"#,
                    PAGE_2
                ),
            )
            .page(
                PAGE_2,
                r#"<a class="product-card-link" href="/app/product-details/2">Two</a>
                <a class="product-card-link" href="https://shop.example.com/app/product-details/3">Three</a>"#,
            )
            .build();
        let resolver = Resolver::new(&session, Duration::from_secs(1));
        let base = base();

        let urls = collector_for(&resolver, &base).collect_detail_urls(PAGE_1).await;
        assert_eq!(
            urls.into_iter().collect::<Vec<_>>(),
            vec![
                "https://shop.example.com/app/product-details/1",
                "https://shop.example.com/app/product-details/2",
                "https://shop.example.com/app/product-details/3",
            ]
        );
        assert_eq!(session.scroll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_is_bounded() {
        // The next control always points back at the same listing
        let session = FixtureSession::builder()
            .page(
                PAGE_1,
                format!(
                    r#"<a href="/product/1">One</a>
                    <a class="next-link" data-fixture-goto="{}">Next</a>"#,
                    PAGE_1
                ),
            )
            .build();
        let resolver = Resolver::new(&session, Duration::from_secs(1));
        let base = base();

        let urls = collector_for(&resolver, &base).collect_detail_urls(PAGE_1).await;
        assert_eq!(urls.len(), 1);
        assert_eq!(session.scroll_count(), MAX_PAGES);
        assert_eq!(session.clicks().len(), MAX_PAGES - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listing_and_pagination_links_not_collected() {
        let session = FixtureSession::builder()
            .page(
                PAGE_1,
                r#"<a class="product-card-link" href="/app/product-details/opco/1">One</a>
                <ul class="pagination"><li class="page-item"><a href="/app/catalog/meat?page=2">2</a></li></ul>
                <div class="sidebar-item"><a href="/app/catalog/dairy">Dairy</a></div>"#,
            )
            .build();
        let resolver = Resolver::new(&session, Duration::from_secs(1));
        let base = base();

        let urls = collector_for(&resolver, &base).collect_detail_urls(PAGE_1).await;
        assert_eq!(
            urls.into_iter().collect::<Vec<_>>(),
            vec!["https://shop.example.com/app/product-details/opco/1"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_next_stops() {
        let session = FixtureSession::builder()
            .page(
                PAGE_1,
                format!(
                    r#"<a href="/item/7">Seven</a>
                    <button disabled data-fixture-goto="{}">Next</button>"#,
                    PAGE_2
                ),
            )
            .page(PAGE_2, "<p></p>")
            .build();
        let resolver = Resolver::new(&session, Duration::from_secs(1));
        let base = base();

        let urls = collector_for(&resolver, &base).collect_detail_urls(PAGE_1).await;
        assert_eq!(urls.len(), 1);
        assert!(session.clicks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_listing_yields_empty_set() {
        let session = FixtureSession::builder()
            .page(PAGE_1, r#"<a href="/about">About</a>"#)
            .build();
        let resolver = Resolver::new(&session, Duration::from_secs(1));
        let base = base();

        let urls = collector_for(&resolver, &base).collect_detail_urls(PAGE_1).await;
        assert!(urls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_failure_yields_empty_set() {
        let session = FixtureSession::builder().build();
        let resolver = Resolver::new(&session, Duration::from_secs(1));
        let base = base();

        let urls = collector_for(&resolver, &base).collect_detail_urls(PAGE_1).await;
        assert!(urls.is_empty());
        assert_eq!(session.scroll_count(), 0);
    }
}
