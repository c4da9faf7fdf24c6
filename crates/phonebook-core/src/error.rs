//! Table error handling

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during table operations
///
/// Absence of matches is not an error: searches and updates report it
/// through [`Lookup`](crate::table::Lookup) and
/// [`UpdateOutcome`](crate::table::UpdateOutcome).
#[derive(Error, Debug)]
pub enum TableError {
    /// Payload handed to insert/update is not a JSON object
    #[error("Document is not a mapping (got {found})")]
    NotAMapping { found: &'static str },

    /// Payload field holds something other than a string
    #[error("Field '{field}' must be a string")]
    InvalidFieldValue { field: String },

    /// Inserted document lacks a value for an indexed field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Query names a field that has no inverted index
    #[error("Unknown index field: '{0}'. Indexed fields are first_name and last_name")]
    UnknownIndexField(String),

    /// Highest id in use is `u64::MAX`, so no new id can be handed out
    #[error("No document ids left: the table already uses the highest id")]
    IdsExhausted,

    /// Listing requested with a page size of zero
    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;
