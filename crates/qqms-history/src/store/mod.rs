//! Time-series stores for history records.

#[cfg(feature = "dynamodb")]
mod dynamo_store;
mod json_store;
mod memory;
mod sqlite_store;

#[cfg(feature = "dynamodb")]
pub use dynamo_store::DynamoStore;
pub use json_store::JsonStore;
pub use memory::MemoryStore;
pub use sqlite_store::SqliteStore;

use async_trait::async_trait;

use crate::error::HistoryResult;
use crate::record::{HistoryRecord, RecordFilter};

/// Trait for append-only time-series storage.
///
/// Records are keyed by `(qubit, timestamp)` within a table. Writing a key
/// that already exists replaces the previous record (last write wins).
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Store name, for logs.
    fn name(&self) -> &str;

    /// Append a record to `table`.
    async fn append(&self, table: &str, record: &HistoryRecord) -> HistoryResult<()>;

    /// Read records from `table` ordered by `(qubit, timestamp)`.
    ///
    /// A table that has never been written reads as empty.
    async fn query(&self, table: &str, filter: &RecordFilter) -> HistoryResult<Vec<HistoryRecord>>;
}
