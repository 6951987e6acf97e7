//! CSV export of product records

use crate::output::traits::{ExportError, ExportResult, ProductSink};
use crate::record::ProductRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One CSV row; field order defines the column order
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    brand: &'a str,
    #[serde(rename = "product_name")]
    name: &'a str,
    packaging: &'a str,
    sku: &'a str,
    image_url: &'a str,
    description: &'a str,
    price: &'a str,
    category: &'a str,
    url: &'a str,
}

impl<'a> From<&'a ProductRecord> for CsvRow<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            brand: &record.brand,
            name: &record.name,
            packaging: &record.packaging,
            sku: &record.sku,
            image_url: &record.image_url,
            description: &record.description,
            price: &record.price,
            category: &record.category,
            url: &record.url,
        }
    }
}

/// Writes records to a UTF-8 CSV file, replacing any previous content
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProductSink for CsvSink {
    fn write_records(&self, records: &[ProductRecord]) -> ExportResult<usize> {
        let valid: Vec<&ProductRecord> = records.iter().filter(|r| r.is_valid()).collect();
        let skipped = records.len() - valid.len();
        if skipped > 0 {
            tracing::info!("Skipping {} invalid records", skipped);
        }
        if valid.is_empty() {
            return Err(ExportError::NoValidRecords);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in &valid {
            writer.serialize(CsvRow::from(*record))?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} products to {}", valid.len(), self.path.display());
        Ok(valid.len())
    }
}
