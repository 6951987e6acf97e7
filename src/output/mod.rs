//! Output module for exporting records and reporting runs
//!
//! This module handles:
//! - Writing valid product records to CSV
//! - Recording per-phase timings and run counters
//! - Printing the end-of-run performance summary

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::{print_statistics, Phase, PhaseTimings, RunStatistics};
pub use traits::{ExportError, ExportResult, ProductSink};

use crate::record::ProductRecord;
use std::path::Path;

/// Exports the valid subset of `records` as CSV at `path`
///
/// # Arguments
///
/// * `records` - All records produced by the run
/// * `path` - Destination file; missing parent directories are created
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written
/// * `Err(ExportError)` - Nothing valid to write, or the file could not be written
pub fn export_products(records: &[ProductRecord], path: &Path) -> ExportResult<usize> {
    CsvSink::new(path).write_records(records)
}
