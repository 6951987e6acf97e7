//! Browser session abstraction
//!
//! The extraction pipeline talks to the browser only through [`BrowserSession`].
//! Two implementations ship with the crate:
//! - [`ChromiumSession`]: a real Chromium instance driven over CDP
//! - [`FixtureSession`]: static HTML documents, for tests and offline selector checks

mod chromium;
mod fixture;

pub use chromium::ChromiumSession;
pub use fixture::{FixtureElement, FixtureSession, FixtureSessionBuilder};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a browser session
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { after: Duration, what: String },

    #[error("Element query '{selector}' failed: {message}")]
    Query { selector: String, message: String },

    #[error("Element interaction failed: {0}")]
    Interaction(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),
}

/// Result type alias for session operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// One navigable browsing context (a tab) plus the primitives the pipeline needs
///
/// Implementations must be usable from several tasks at once only through
/// separate tabs ([`BrowserSession::open_tab`]); a single tab is driven by one
/// operation at a time.
#[async_trait]
pub trait BrowserSession: Send + Sync + Sized {
    /// Handle to an element on the current page
    type Element: Send + Sync;

    /// Navigates to `url`, failing if the page has not loaded within `timeout`
    async fn goto(&self, url: &str, timeout: Duration) -> DriverResult<()>;

    /// URL of the current page
    async fn current_url(&self) -> DriverResult<String>;

    /// Title of the current page (empty when absent)
    async fn title(&self) -> DriverResult<String>;

    /// Zero-or-many query for a CSS selector, within `scope` or the whole page
    async fn query_all(
        &self,
        scope: Option<&Self::Element>,
        css: &str,
    ) -> DriverResult<Vec<Self::Element>>;

    /// Rendered text of an element (empty when absent)
    async fn inner_text(&self, element: &Self::Element) -> DriverResult<String>;

    /// Attribute value of an element
    async fn attribute(&self, element: &Self::Element, name: &str)
        -> DriverResult<Option<String>>;

    async fn click(&self, element: &Self::Element) -> DriverResult<()>;

    async fn hover(&self, element: &Self::Element) -> DriverResult<()>;

    async fn scroll_into_view(&self, element: &Self::Element) -> DriverResult<()>;

    /// Focuses an input, clears its value and types `text`
    async fn clear_and_type(&self, element: &Self::Element, text: &str) -> DriverResult<()>;

    /// Scrolls the window to the bottom to trigger lazy loading
    async fn scroll_to_bottom(&self) -> DriverResult<()>;

    /// Opens a new tab in the same browser (sharing cookies and storage)
    async fn open_tab(&self) -> DriverResult<Self>;

    /// Closes this tab; closing the root session shuts the browser down
    async fn close(self) -> DriverResult<()>;
}

/// Runs `fut`, converting an elapsed `after` into [`DriverError::Timeout`]
pub async fn bounded<T, F>(after: Duration, what: &str, fut: F) -> DriverResult<T>
where
    F: Future<Output = DriverResult<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(DriverError::Timeout {
            after,
            what: what.to_string(),
        }),
    }
}

/// Fixed delay letting client-side rendering catch up
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
