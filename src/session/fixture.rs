//! Fixture browser session backed by static HTML
//!
//! Serves pre-captured HTML documents keyed by URL and answers element queries
//! with the `scraper` crate. Used by the test suite and by `--inspect`, which
//! runs the extraction chains against a saved detail page.
//!
//! A few `data-fixture-*` attributes script the dynamic behavior real pages have:
//! - `data-fixture-goto="URL"`: clicking the element navigates to `URL`
//! - `data-fixture-enable-after="N"`: the element reports a `disabled`
//!   attribute for its first `N` reads, then none

use crate::session::{bounded, BrowserSession, DriverError, DriverResult};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const BLANK: &str = "about:blank";
const GOTO_ATTR: &str = "data-fixture-goto";
const ENABLE_AFTER_ATTR: &str = "data-fixture-enable-after";

/// Snapshot of an element taken at query time
#[derive(Debug, Clone)]
pub struct FixtureElement {
    key: String,
    text: String,
    attrs: BTreeMap<String, String>,
    inner_html: String,
}

#[derive(Debug, Clone)]
struct FixturePage {
    html: String,
    delay: Duration,
}

/// Interaction log and page table shared by every tab
#[derive(Debug, Default)]
struct Shared {
    pages: HashMap<String, FixturePage>,
    queries: Vec<String>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    typed: Vec<String>,
    attribute_reads: HashMap<String, usize>,
    hovers: usize,
    scrolls: usize,
    tabs_opened: usize,
}

/// Browser session over static HTML documents
#[derive(Debug)]
pub struct FixtureSession {
    shared: Arc<Mutex<Shared>>,
    current: Mutex<String>,
}

/// Builder for [`FixtureSession`]
#[derive(Debug, Default)]
pub struct FixtureSessionBuilder {
    pages: HashMap<String, FixturePage>,
}

impl FixtureSessionBuilder {
    /// Registers the document served for `url`
    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(
            url.into(),
            FixturePage {
                html: html.into(),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Registers a document whose navigation takes `delay` to complete
    pub fn slow_page(
        mut self,
        url: impl Into<String>,
        html: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.pages.insert(
            url.into(),
            FixturePage {
                html: html.into(),
                delay,
            },
        );
        self
    }

    pub fn build(self) -> FixtureSession {
        FixtureSession {
            shared: Arc::new(Mutex::new(Shared {
                pages: self.pages,
                ..Shared::default()
            })),
            current: Mutex::new(BLANK.to_string()),
        }
    }
}

impl FixtureSession {
    pub fn builder() -> FixtureSessionBuilder {
        FixtureSessionBuilder::default()
    }

    /// Loads a saved HTML file and serves it at `url`
    pub fn from_html_file(url: &str, path: &Path) -> std::io::Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::builder().page(url, html).build())
    }

    /// Every CSS selector queried so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.shared().queries.clone()
    }

    /// Every URL navigated to (including click-driven navigation), in order
    pub fn navigations(&self) -> Vec<String> {
        self.shared().navigations.clone()
    }

    /// Keys of every clicked element, in order
    pub fn clicks(&self) -> Vec<String> {
        self.shared().clicks.clone()
    }

    /// Every value typed into an input, in order
    pub fn typed_values(&self) -> Vec<String> {
        self.shared().typed.clone()
    }

    pub fn hover_count(&self) -> usize {
        self.shared().hovers
    }

    pub fn scroll_count(&self) -> usize {
        self.shared().scrolls
    }

    pub fn tabs_opened(&self) -> usize {
        self.shared().tabs_opened
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_current(&self, url: &str) {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = url.to_string();
    }

    fn current_html(&self) -> String {
        let url = self.current();
        self.shared()
            .pages
            .get(&url)
            .map(|page| page.html.clone())
            .unwrap_or_default()
    }

    fn is_disabled(&self, element: &FixtureElement) -> bool {
        match element
            .attrs
            .get(ENABLE_AFTER_ATTR)
            .and_then(|n| n.parse::<usize>().ok())
        {
            Some(threshold) => {
                let mut shared = self.shared();
                let reads = shared
                    .attribute_reads
                    .entry(element.key.clone())
                    .or_insert(0);
                *reads += 1;
                *reads <= threshold
            }
            None => element.attrs.contains_key("disabled"),
        }
    }
}

/// Parses `html` and snapshots every element matching `css`
fn snapshot(
    html: &str,
    fragment: bool,
    css: &str,
    key_prefix: &str,
) -> DriverResult<Vec<FixtureElement>> {
    let selector = Selector::parse(css).map_err(|e| DriverError::Query {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })?;

    let document = if fragment {
        Html::parse_fragment(html)
    } else {
        Html::parse_document(html)
    };

    Ok(document
        .select(&selector)
        .map(|element| to_fixture_element(element, key_prefix))
        .collect())
}

fn to_fixture_element(element: ElementRef<'_>, key_prefix: &str) -> FixtureElement {
    FixtureElement {
        key: format!("{}#{:?}", key_prefix, element.id()),
        text: element.text().collect::<String>(),
        attrs: element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        inner_html: element.inner_html(),
    }
}

fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|title| title.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

#[async_trait]
impl BrowserSession for FixtureSession {
    type Element = FixtureElement;

    async fn goto(&self, url: &str, timeout: Duration) -> DriverResult<()> {
        let delay = {
            let mut shared = self.shared();
            shared.navigations.push(url.to_string());
            match shared.pages.get(url) {
                Some(page) => page.delay,
                None => {
                    return Err(DriverError::Navigation {
                        url: url.to_string(),
                        message: "no fixture registered for this URL".to_string(),
                    })
                }
            }
        };

        if !delay.is_zero() {
            bounded(timeout, url, async {
                tokio::time::sleep(delay).await;
                Ok(())
            })
            .await?;
        }

        self.set_current(url);
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.current())
    }

    async fn title(&self) -> DriverResult<String> {
        Ok(document_title(&self.current_html()))
    }

    async fn query_all(
        &self,
        scope: Option<&FixtureElement>,
        css: &str,
    ) -> DriverResult<Vec<FixtureElement>> {
        self.shared().queries.push(css.to_string());

        match scope {
            Some(parent) => snapshot(&parent.inner_html, true, css, &parent.key),
            None => snapshot(&self.current_html(), false, css, &self.current()),
        }
    }

    async fn inner_text(&self, element: &FixtureElement) -> DriverResult<String> {
        Ok(element.text.clone())
    }

    async fn attribute(
        &self,
        element: &FixtureElement,
        name: &str,
    ) -> DriverResult<Option<String>> {
        if name == "disabled" {
            return Ok(self.is_disabled(element).then(String::new));
        }
        Ok(element.attrs.get(name).cloned())
    }

    async fn click(&self, element: &FixtureElement) -> DriverResult<()> {
        if element.attrs.contains_key("disabled") && !element.attrs.contains_key(ENABLE_AFTER_ATTR)
        {
            return Err(DriverError::Interaction(format!(
                "element {} is disabled",
                element.key
            )));
        }

        let target = {
            let mut shared = self.shared();
            shared.clicks.push(element.key.clone());
            match element.attrs.get(GOTO_ATTR) {
                Some(target) if shared.pages.contains_key(target) => {
                    shared.navigations.push(target.clone());
                    Some(target.clone())
                }
                Some(target) => {
                    return Err(DriverError::Navigation {
                        url: target.clone(),
                        message: "no fixture registered for click target".to_string(),
                    })
                }
                None => None,
            }
        };

        if let Some(target) = target {
            self.set_current(&target);
        }
        Ok(())
    }

    async fn hover(&self, _element: &FixtureElement) -> DriverResult<()> {
        self.shared().hovers += 1;
        Ok(())
    }

    async fn scroll_into_view(&self, _element: &FixtureElement) -> DriverResult<()> {
        Ok(())
    }

    async fn clear_and_type(&self, _element: &FixtureElement, text: &str) -> DriverResult<()> {
        self.shared().typed.push(text.to_string());
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> DriverResult<()> {
        self.shared().scrolls += 1;
        Ok(())
    }

    async fn open_tab(&self) -> DriverResult<Self> {
        self.shared().tabs_opened += 1;
        Ok(Self {
            shared: Arc::clone(&self.shared),
            current: Mutex::new(BLANK.to_string()),
        })
    }

    async fn close(self) -> DriverResult<()> {
        Ok(())
    }
}
