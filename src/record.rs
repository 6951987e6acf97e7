//! Harvested data types
//!
//! - [`ProductRecord`]: one product detail page, plus the validity rule
//! - [`CategoryUrlMap`]: detail URLs discovered per category, in configured order
//! - [`WorkItem`]: one `(category, url)` entry of the flattened work list

use std::collections::BTreeSet;

/// Structured data extracted from one product detail page
///
/// Created with only `url` (and `category`) set; each remaining field is
/// written once by its extractor. Absent fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    pub url: String,
    pub brand: String,
    pub name: String,
    pub packaging: String,
    pub sku: String,
    pub image_url: String,
    pub description: String,
    pub price: String,
    pub category: String,
}

impl ProductRecord {
    pub fn new(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// A record is valid when it has a URL and at least one of name, brand or SKU
    pub fn is_valid(&self) -> bool {
        !self.url.is_empty()
            && (!self.name.is_empty() || !self.brand.is_empty() || !self.sku.is_empty())
    }

    /// Short display name for progress lines
    pub fn preview(&self, max_chars: usize) -> String {
        let source = if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        };
        source.chars().take(max_chars).collect()
    }
}

/// One unit of extraction work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub category: String,
    pub url: String,
}

/// Category name to unique detail URLs, iterated in insertion order
///
/// URLs within a category are deduplicated and kept sorted.
#[derive(Debug, Clone, Default)]
pub struct CategoryUrlMap {
    entries: Vec<(String, BTreeSet<String>)>,
}

impl CategoryUrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the URLs found for `category`; empty sets are not stored
    ///
    /// Inserting a category twice merges the URL sets.
    pub fn insert(&mut self, category: &str, urls: BTreeSet<String>) {
        if urls.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(name, _)| name == category) {
            Some((_, existing)) => existing.extend(urls),
            None => self.entries.push((category.to_string(), urls)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of categories with at least one URL
    pub fn category_count(&self) -> usize {
        self.entries.len()
    }

    /// Total URLs across all categories
    pub fn url_count(&self) -> usize {
        self.entries.iter().map(|(_, urls)| urls.len()).sum()
    }

    pub fn get(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, urls)| urls)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Consumes the map into a work list in category order, then URL order
    ///
    /// # Arguments
    ///
    /// * `limit` - Keep only the first `limit` items; `None` keeps everything
    pub fn into_work_list(self, limit: Option<usize>) -> Vec<WorkItem> {
        let items = self.entries.into_iter().flat_map(|(category, urls)| {
            urls.into_iter().map(move |url| WorkItem {
                category: category.clone(),
                url,
            })
        });

        match limit {
            Some(limit) => items.take(limit).collect(),
            None => items.collect(),
        }
    }
}
