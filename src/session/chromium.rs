//! Chromium-backed browser session
//!
//! Launches a Chromium instance through chromiumoxide, applies basic
//! fingerprint softening and optional resource blocking to every tab, and maps
//! CDP failures into [`DriverError`].

use crate::config::BrowserConfig;
use crate::session::{bounded, BrowserSession, DriverError, DriverResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, SetBlockedUrLsParams};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Desktop user agent used when the config does not override it
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Hides the automation flag from page scripts
const MASK_WEBDRIVER: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// Heavy static assets that are never needed for extraction
const BLOCKED_ASSET_PATTERNS: &[&str] = &[
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg", "*.ico", "*.css", "*.woff",
    "*.woff2", "*.ttf", "*.otf", "*.mp4", "*.webm", "*.mp3",
];

/// Tracker and ad domains
const BLOCKED_DOMAINS: &[&str] = &[
    "googletagmanager.com",
    "google-analytics.com",
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "pinterest.com",
    "instagram.com",
    "doubleclick.net",
    "googlesyndication.com",
    "amazon-adsystem.com",
];

/// Settings applied to each new tab
#[derive(Debug, Clone)]
struct TabSetup {
    user_agent: String,
    block_resources: bool,
}

/// A Chromium tab; the root session also owns the browser process
pub struct ChromiumSession {
    browser: Arc<Mutex<Browser>>,
    page: Page,
    setup: Arc<TabSetup>,
    /// CDP event loop; only present on the root session
    handler: Option<JoinHandle<()>>,
}

impl ChromiumSession {
    /// Launches Chromium and opens the root tab
    ///
    /// # Arguments
    ///
    /// * `config` - Browser launch settings (headless mode, window size, blocking)
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumSession)` - The root session, ready to navigate
    /// * `Err(DriverError::Launch)` - Chromium could not be started
    pub async fn launch(config: &BrowserConfig) -> DriverResult<Self> {
        let mut builder = LaunchConfig::builder()
            .window_size(config.window_width, config.window_height)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .no_sandbox();

        if !config.headless {
            builder = builder.with_head();
        }

        let launch_config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        let setup = Arc::new(TabSetup {
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            block_resources: config.block_resources,
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;
        prepare_tab(&page, &setup).await?;

        if setup.block_resources {
            tracing::info!("Resource blocking enabled");
        } else {
            tracing::info!("Resource blocking disabled");
        }

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            page,
            setup,
            handler: Some(handler),
        })
    }
}

/// Applies fingerprint softening and resource blocking to a fresh tab
async fn prepare_tab(page: &Page, setup: &TabSetup) -> DriverResult<()> {
    page.set_user_agent(setup.user_agent.clone())
        .await
        .map_err(|e| DriverError::Launch(format!("set user agent: {}", e)))?;

    page.evaluate_on_new_document(MASK_WEBDRIVER)
        .await
        .map_err(|e| DriverError::Script(e.to_string()))?;

    if setup.block_resources {
        let patterns: Vec<String> = BLOCKED_ASSET_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .chain(BLOCKED_DOMAINS.iter().map(|d| format!("*{}*", d)))
            .collect();

        page.execute(EnableParams::default())
            .await
            .map_err(|e| DriverError::Launch(format!("enable network domain: {}", e)))?;
        page.execute(SetBlockedUrLsParams::new(patterns))
            .await
            .map_err(|e| DriverError::Launch(format!("set blocked urls: {}", e)))?;
    }

    Ok(())
}

fn interaction(action: &str, e: impl std::fmt::Display) -> DriverError {
    DriverError::Interaction(format!("{}: {}", action, e))
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Element = Element;

    async fn goto(&self, url: &str, timeout: Duration) -> DriverResult<()> {
        bounded(timeout, url, async {
            self.page
                .goto(url)
                .await
                .map(|_| ())
                .map_err(|e| DriverError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
        })
        .await
    }

    async fn current_url(&self) -> DriverResult<String> {
        self.page
            .url()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn title(&self) -> DriverResult<String> {
        self.page
            .get_title()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn query_all(&self, scope: Option<&Element>, css: &str) -> DriverResult<Vec<Element>> {
        let found = match scope {
            Some(element) => element.find_elements(css).await,
            None => self.page.find_elements(css).await,
        };

        found.map_err(|e| DriverError::Query {
            selector: css.to_string(),
            message: e.to_string(),
        })
    }

    async fn inner_text(&self, element: &Element) -> DriverResult<String> {
        element
            .inner_text()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| interaction("read text", e))
    }

    async fn attribute(&self, element: &Element, name: &str) -> DriverResult<Option<String>> {
        element
            .attribute(name)
            .await
            .map_err(|e| interaction("read attribute", e))
    }

    async fn click(&self, element: &Element) -> DriverResult<()> {
        element
            .click()
            .await
            .map(|_| ())
            .map_err(|e| interaction("click", e))
    }

    async fn hover(&self, element: &Element) -> DriverResult<()> {
        element
            .hover()
            .await
            .map(|_| ())
            .map_err(|e| interaction("hover", e))
    }

    async fn scroll_into_view(&self, element: &Element) -> DriverResult<()> {
        element
            .scroll_into_view()
            .await
            .map(|_| ())
            .map_err(|e| interaction("scroll into view", e))
    }

    async fn clear_and_type(&self, element: &Element, text: &str) -> DriverResult<()> {
        element
            .click()
            .await
            .map_err(|e| interaction("focus input", e))?;
        element
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                false,
            )
            .await
            .map_err(|e| interaction("clear input", e))?;
        element
            .type_str(text)
            .await
            .map(|_| ())
            .map_err(|e| interaction("type", e))
    }

    async fn scroll_to_bottom(&self) -> DriverResult<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn open_tab(&self) -> DriverResult<Self> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| DriverError::Launch(format!("open tab: {}", e)))?
        };
        prepare_tab(&page, &self.setup).await?;

        Ok(Self {
            browser: Arc::clone(&self.browser),
            page,
            setup: Arc::clone(&self.setup),
            handler: None,
        })
    }

    async fn close(self) -> DriverResult<()> {
        let Self {
            browser,
            page,
            handler,
            ..
        } = self;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab: {}", e);
        }

        if let Some(handler) = handler {
            let mut browser = browser.lock().await;
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!("Failed waiting for browser exit: {}", e);
            }
            handler.abort();
            tracing::info!("Browser closed");
        }

        Ok(())
    }
}
