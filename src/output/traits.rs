//! Export sink trait and error types

use crate::record::ProductRecord;
use thiserror::Error;

/// Errors that can occur while exporting records
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No valid product records to export")]
    NoValidRecords,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Destination for harvested product records
///
/// Implementations write only valid records (see [`ProductRecord::is_valid`])
/// and must leave the destination untouched when there is nothing valid to
/// write.
pub trait ProductSink {
    /// Writes the valid subset of `records`
    ///
    /// # Arguments
    ///
    /// * `records` - Every record produced by the run, valid or not
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records written
    /// * `Err(ExportError::NoValidRecords)` - Nothing valid to write
    /// * `Err(ExportError)` - The destination could not be written
    fn write_records(&self, records: &[ProductRecord]) -> ExportResult<usize>;
}
