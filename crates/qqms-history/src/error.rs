//! Error handling for history persistence.

use thiserror::Error;

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur while writing or reading history records.
///
/// Every variant is a persistence failure for a single record or query;
/// none of them imply the store is unusable for later writes.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The store rejected the write or could not be reached.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Table identifier is empty or contains characters the store cannot use.
    #[error("Invalid table id: {0:?}")]
    InvalidTable(String),

    /// Record carries a value the store must not hold.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// SQLite database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for HistoryError {
    fn from(e: rusqlite::Error) -> Self {
        HistoryError::DatabaseError(e.to_string())
    }
}

/// Check a table identifier is usable as a file stem, SQL value and DynamoDB table name.
pub(crate) fn validate_table(table: &str) -> HistoryResult<()> {
    let ok = !table.is_empty()
        && table.len() <= 255
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && table != "."
        && table != "..";
    if ok {
        Ok(())
    } else {
        Err(HistoryError::InvalidTable(table.to_string()))
    }
}
