//! In-process store for tests and dry runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::error::{HistoryResult, validate_table};
use crate::record::{HistoryRecord, RecordFilter, RecordKey};
use crate::store::TimeSeriesStore;

/// In-memory time-series store. Contents are lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<FxHashMap<String, BTreeMap<RecordKey, HistoryRecord>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held in `table`.
    pub async fn len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, BTreeMap::len)
    }

    /// Whether `table` holds no records.
    pub async fn is_empty(&self, table: &str) -> bool {
        self.len(table).await == 0
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, table: &str, record: &HistoryRecord) -> HistoryResult<()> {
        validate_table(table)?;
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(record.key(), record.clone());
        Ok(())
    }

    async fn query(&self, table: &str, filter: &RecordFilter) -> HistoryResult<Vec<HistoryRecord>> {
        validate_table(table)?;
        let tables = self.tables.read().await;
        let records = tables
            .get(table)
            .map(|t| t.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(filter.apply(records))
    }
}
