//! QQMS measurement history.
//!
//! Persists fitted decoherence constants as an append-only time series so
//! device health can be tracked across calibration runs.
//!
//! # Stores
//!
//! | Store | Use | Feature |
//! |-------|-----|---------|
//! | [`MemoryStore`] | tests, dry runs | |
//! | [`JsonStore`] | single host, one `.jsonl` file per table | |
//! | [`SqliteStore`] | single host, indexed queries | |
//! | `DynamoStore` | shared AWS table | `dynamodb` |
//!
//! # Example
//!
//! ```ignore
//! use qqms_hal::DecayModel;
//! use qqms_history::{HistoryWriter, SqliteStore};
//!
//! let store = SqliteStore::new("history.db")?;
//! let writer = HistoryWriter::new();
//! writer
//!     .record("T1History", 0, 12.3e-6, 0.4e-6, DecayModel::Relaxation, &store)
//!     .await?;
//! ```

pub mod error;
pub mod record;
pub mod store;
pub mod writer;

pub use error::{HistoryError, HistoryResult};
pub use record::{HistoryRecord, RecordFilter, RecordKey};
#[cfg(feature = "dynamodb")]
pub use store::DynamoStore;
pub use store::{JsonStore, MemoryStore, SqliteStore, TimeSeriesStore};
pub use writer::HistoryWriter;
