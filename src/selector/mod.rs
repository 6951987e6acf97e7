//! Selector resolution engine
//!
//! A logical field (a brand label, a "Next" control, a menu entry) is located
//! through a [`SelectorChain`]: an ordered list of [`Locator`]s tried in
//! priority order. This module handles:
//! - First-match resolution with short-circuit (later locators are never queried)
//! - All-matches resolution for the first productive locator
//! - Union resolution across every locator (link discovery)
//! - Two-stage text filtering (structural query, then runtime text predicate)
//! - Bounded waiting for a chain to appear ([`wait`])

pub mod chains;
pub mod wait;

pub use wait::poll_until;

use crate::session::{bounded, BrowserSession};
use std::time::Duration;

/// What a locator reads from a matched element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Rendered text; empty text is not a match
    Text,
    /// Named attribute; missing or empty attribute is not a match
    Attr(&'static str),
    /// Any matched element counts (click targets such as icon buttons)
    Presence,
}

/// One candidate way of finding an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    /// Structural CSS query
    pub css: &'static str,
    /// Case-insensitive "contains" predicate over the element's text
    pub text: Option<&'static str>,
    pub extract: Extract,
}

impl Locator {
    pub const fn text(css: &'static str) -> Self {
        Self {
            css,
            text: None,
            extract: Extract::Text,
        }
    }

    pub const fn attr(css: &'static str, name: &'static str) -> Self {
        Self {
            css,
            text: None,
            extract: Extract::Attr(name),
        }
    }

    pub const fn present(css: &'static str) -> Self {
        Self {
            css,
            text: None,
            extract: Extract::Presence,
        }
    }

    /// Same locator, restricted to elements whose text contains `needle`
    pub const fn containing(self, needle: &'static str) -> Self {
        Self {
            text: Some(needle),
            ..self
        }
    }
}

/// Ordered candidate locators for one logical field; priority is order
pub type SelectorChain = &'static [Locator];

/// A matched element and the content extracted from it
#[derive(Debug)]
pub struct Resolved<E> {
    pub element: E,
    /// Trimmed text or attribute value (may be empty for [`Extract::Presence`])
    pub value: String,
    /// Index of the locator that produced the match
    pub locator: usize,
}

/// Case-insensitive substring test
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Resolves selector chains against one browser session
///
/// Every individual locator query is bounded by the element timeout. A query
/// error or timeout on one locator counts as a miss for that locator only.
pub struct Resolver<'s, S: BrowserSession> {
    session: &'s S,
    element_timeout: Duration,
}

impl<'s, S: BrowserSession> Resolver<'s, S> {
    pub fn new(session: &'s S, element_timeout: Duration) -> Self {
        Self {
            session,
            element_timeout,
        }
    }

    pub fn session(&self) -> &'s S {
        self.session
    }

    pub fn element_timeout(&self) -> Duration {
        self.element_timeout
    }

    /// First match of the first productive locator
    ///
    /// # Arguments
    ///
    /// * `chain` - Locators in priority order
    /// * `scope` - Element to search within, or `None` for the whole page
    ///
    /// # Returns
    ///
    /// * `Some(Resolved)` - The first element with non-empty content
    /// * `None` - No locator produced a match (the field is absent)
    pub async fn resolve(
        &self,
        chain: SelectorChain,
        scope: Option<&S::Element>,
    ) -> Option<Resolved<S::Element>> {
        for (index, locator) in chain.iter().enumerate() {
            let mut found = self.matches(index, locator, scope, None, true).await;
            if let Some(first) = found.pop() {
                return Some(first);
            }
        }
        None
    }

    /// All matches of the first productive locator
    pub async fn resolve_all(
        &self,
        chain: SelectorChain,
        scope: Option<&S::Element>,
    ) -> Vec<Resolved<S::Element>> {
        for (index, locator) in chain.iter().enumerate() {
            let found = self.matches(index, locator, scope, None, false).await;
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Matches of every locator in the chain, in chain order
    pub async fn resolve_union(
        &self,
        chain: SelectorChain,
        scope: Option<&S::Element>,
    ) -> Vec<Resolved<S::Element>> {
        let mut all = Vec::new();
        for (index, locator) in chain.iter().enumerate() {
            all.extend(self.matches(index, locator, scope, None, false).await);
        }
        all
    }

    /// First match whose text also contains a runtime `needle`
    pub async fn resolve_containing(
        &self,
        chain: SelectorChain,
        needle: &str,
    ) -> Option<Resolved<S::Element>> {
        for (index, locator) in chain.iter().enumerate() {
            let mut found = self.matches(index, locator, None, Some(needle), true).await;
            if let Some(first) = found.pop() {
                return Some(first);
            }
        }
        None
    }

    /// First text match, or `None`
    pub async fn resolve_text(&self, chain: SelectorChain) -> Option<String> {
        self.resolve(chain, None).await.map(|r| r.value)
    }

    /// Waits up to `timeout` for the chain to resolve, checking every `interval`
    pub async fn wait_for_chain(
        &self,
        chain: SelectorChain,
        timeout: Duration,
        interval: Duration,
    ) -> Option<Resolved<S::Element>> {
        let attempts = wait::attempts_within(timeout, interval);
        poll_until(attempts, interval, move || self.resolve(chain, None)).await
    }

    /// Runs one locator, returning its productive matches
    async fn matches(
        &self,
        index: usize,
        locator: &Locator,
        scope: Option<&S::Element>,
        needle: Option<&str>,
        first_only: bool,
    ) -> Vec<Resolved<S::Element>> {
        let elements = match bounded(
            self.element_timeout,
            locator.css,
            self.session.query_all(scope, locator.css),
        )
        .await
        {
            Ok(elements) => elements,
            Err(e) => {
                tracing::trace!("Locator '{}' missed: {}", locator.css, e);
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        for element in elements {
            match self.inspect(locator, &element, needle).await {
                Some(value) => {
                    found.push(Resolved {
                        element,
                        value,
                        locator: index,
                    });
                    if first_only {
                        break;
                    }
                }
                None => continue,
            }
        }

        if found.is_empty() {
            tracing::trace!("Locator '{}' produced no usable match", locator.css);
        }
        found
    }

    /// Applies text predicates and extracts content; `None` means not a match
    async fn inspect(
        &self,
        locator: &Locator,
        element: &S::Element,
        needle: Option<&str>,
    ) -> Option<String> {
        let needs_text = locator.text.is_some()
            || needle.is_some()
            || matches!(locator.extract, Extract::Text | Extract::Presence);

        let text = if needs_text {
            match self.session.inner_text(element).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::trace!("Could not read text for '{}': {}", locator.css, e);
                    return None;
                }
            }
        } else {
            String::new()
        };

        let predicates: [Option<&str>; 2] = [locator.text, needle];
        for wanted in predicates.into_iter().flatten() {
            if !contains_ignore_case(&text, wanted) {
                return None;
            }
        }

        match locator.extract {
            Extract::Text => {
                let value = text.trim().to_string();
                (!value.is_empty()).then_some(value)
            }
            Extract::Presence => Some(text.trim().to_string()),
            Extract::Attr(name) => match self.session.attribute(element, name).await {
                Ok(Some(value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
                Ok(_) => None,
                Err(e) => {
                    tracing::trace!("Could not read '{}' on '{}': {}", name, locator.css, e);
                    None
                }
            },
        }
    }
}
