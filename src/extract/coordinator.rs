//! Field extraction coordinator
//!
//! Loads one product detail page and runs every field extractor against it.
//! Fields are independent: a missing or failing field leaves that field empty
//! and never affects the others.

use crate::extract::normalize::{clean_price, clean_text_field, format_description};
use crate::extract::{ExtractionError, ExtractionResult};
use crate::record::ProductRecord;
use crate::selector::{chains, Resolver, SelectorChain};
use crate::session::{settle, BrowserSession};
use std::fmt;
use std::time::Duration;

const SETTLE_AFTER_LOAD: Duration = Duration::from_secs(3);
const SETTLE_AFTER_READ_MORE: Duration = Duration::from_secs(1);

/// Extracted product fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Brand,
    Name,
    Packaging,
    Sku,
    ImageUrl,
    Description,
    Price,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Name => "name",
            Self::Packaging => "packaging",
            Self::Sku => "sku",
            Self::ImageUrl => "image_url",
            Self::Description => "description",
            Self::Price => "price",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts product records from detail pages
pub struct FieldExtractor<'s, S: BrowserSession> {
    resolver: Resolver<'s, S>,
    page_load_timeout: Duration,
}

impl<'s, S: BrowserSession> FieldExtractor<'s, S> {
    pub fn new(session: &'s S, element_timeout: Duration, page_load_timeout: Duration) -> Self {
        Self {
            resolver: Resolver::new(session, element_timeout),
            page_load_timeout,
        }
    }

    /// Loads `url` and extracts every field
    ///
    /// Never fails. When the page cannot be loaded the record carries only
    /// `url` and `category`, which makes it invalid for export.
    ///
    /// # Arguments
    ///
    /// * `url` - Product detail page URL
    /// * `category` - Category the URL was discovered under
    pub async fn extract(&self, url: &str, category: &str) -> ProductRecord {
        let mut record = ProductRecord::new(url, category);

        if let Err(e) = self
            .resolver
            .session()
            .goto(url, self.page_load_timeout)
            .await
        {
            tracing::warn!("Failed to load product page {}: {}", url, e);
            return record;
        }
        settle(SETTLE_AFTER_LOAD).await;

        self.fill(&mut record).await;
        tracing::debug!(
            "Extracted {}: brand='{}' name='{}' sku='{}' price='{}'",
            url,
            record.brand,
            record.name,
            record.sku,
            record.price
        );
        record
    }

    /// Runs every field extractor against the current page
    pub async fn fill(&self, record: &mut ProductRecord) {
        record.brand = settle_field(self.text_field(Field::Brand, chains::BRAND).await);
        record.name = settle_field(self.text_field(Field::Name, chains::NAME).await);
        record.packaging = settle_field(self.text_field(Field::Packaging, chains::PACKAGING).await);
        record.sku = settle_field(self.text_field(Field::Sku, chains::SKU).await);
        record.image_url = settle_field(self.image_url().await);
        record.description = settle_field(self.description().await);
        record.price = settle_field(self.price().await);
    }

    async fn text_field(&self, field: Field, chain: SelectorChain) -> ExtractionResult {
        self.resolver
            .resolve_text(chain)
            .await
            .map(|text| clean_text_field(&text))
            .ok_or(ExtractionError::Missing(field))
    }

    async fn price(&self) -> ExtractionResult {
        self.text_field(Field::Price, chains::PRICE)
            .await
            .map(|text| clean_price(&text))
    }

    async fn image_url(&self) -> ExtractionResult {
        self.resolver
            .resolve(chains::IMAGE, None)
            .await
            .map(|image| image.value)
            .ok_or(ExtractionError::Missing(Field::ImageUrl))
    }

    /// Expands the description when a read-more control exists, then formats it
    async fn description(&self) -> ExtractionResult {
        let raw = match self.resolver.resolve(chains::READ_MORE, None).await {
            Some(read_more) => {
                self.resolver
                    .session()
                    .click(&read_more.element)
                    .await
                    .map_err(|source| ExtractionError::Interaction {
                        field: Field::Description,
                        source,
                    })?;
                settle(SETTLE_AFTER_READ_MORE).await;

                match self.resolver.resolve_text(chains::DESCRIPTION_EXPANDED).await {
                    Some(text) => Some(text),
                    None => self.resolver.resolve_text(chains::DESCRIPTION).await,
                }
            }
            None => self.resolver.resolve_text(chains::DESCRIPTION).await,
        };

        raw.map(|text| format_description(&text))
            .ok_or(ExtractionError::Missing(Field::Description))
    }
}

/// Converts a field result into the stored value
fn settle_field(result: ExtractionResult) -> String {
    match result {
        Ok(value) => value,
        Err(ExtractionError::Missing(field)) => {
            tracing::debug!("Field {} not found", field);
            String::new()
        }
        Err(e) => {
            tracing::warn!("Field extraction failed: {}", e);
            String::new()
        }
    }
}
