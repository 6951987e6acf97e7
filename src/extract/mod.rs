//! Product detail extraction
//!
//! - [`coordinator`]: visits a detail page and fills a [`crate::ProductRecord`]
//!   field by field, each through its own selector chain
//! - [`normalize`]: text, price and description cleanup

mod coordinator;
pub mod normalize;

pub use coordinator::{Field, FieldExtractor};

use crate::session::DriverError;
use thiserror::Error;

/// Errors raised while extracting a single field
///
/// These never escape the coordinator; a failed field is left empty.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{0} not found")]
    Missing(Field),

    #[error("{field} interaction failed: {source}")]
    Interaction {
        field: Field,
        #[source]
        source: DriverError,
    },
}

/// Result type alias for field extraction
pub type ExtractionResult = std::result::Result<String, ExtractionError>;
