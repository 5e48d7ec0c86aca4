//! JSON-lines file persistence for development and single-host use.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{HistoryError, HistoryResult, validate_table};
use crate::record::{HistoryRecord, RecordFilter};
use crate::store::TimeSeriesStore;

/// JSON-lines file store.
///
/// Each table is one `<table>.jsonl` file under the base directory; every
/// append adds one line. Reads replay the file so a repeated key resolves
/// to its last line.
pub struct JsonStore {
    /// Base directory for table files.
    base_dir: PathBuf,

    /// Serialises appends so lines never interleave.
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Create a new JSON store at the given path.
    pub async fn new(base_dir: impl AsRef<Path>) -> HistoryResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;

        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Base directory holding the table files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.base_dir.join(format!("{table}.jsonl"))
    }
}

#[async_trait]
impl TimeSeriesStore for JsonStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn append(&self, table: &str, record: &HistoryRecord) -> HistoryResult<()> {
        validate_table(table)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.table_path(table))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    async fn query(&self, table: &str, filter: &RecordFilter) -> HistoryResult<Vec<HistoryRecord>> {
        validate_table(table)?;
        let path = self.table_path(table);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HistoryError::IoError(e)),
        };

        let mut latest = BTreeMap::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(line) {
                Ok(record) => {
                    latest.insert(record.key(), record);
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed line {} in {:?}: {}", lineno + 1, path, e);
                }
            }
        }

        Ok(filter.apply(latest.into_values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qqms_hal::DecayModel;

    fn record(qubit: u32, value: f64) -> HistoryRecord {
        HistoryRecord {
            qubit,
            timestamp: Utc::now(),
            value,
            std_dev: value / 100.0,
            model: DecayModel::Dephasing,
        }
    }

    #[tokio::test]
    async fn test_json_store_basic() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();

        store.append("T2History", &record(0, 8e-5)).await.unwrap();
        store.append("T2History", &record(1, 6e-5)).await.unwrap();

        let all = store.query("T2History", &RecordFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].qubit, 0);
        assert_eq!(all[1].model, DecayModel::Dephasing);

        let only_one = store
            .query("T2History", &RecordFilter::all().qubit(1))
            .await
            .unwrap();
        assert_eq!(only_one.len(), 1);
        assert_eq!(only_one[0].value, 6e-5);
    }

    #[tokio::test]
    async fn test_json_store_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();
        store.append("t", &record(3, 1e-4)).await.unwrap();

        let path = dir.path().join("t.jsonl");
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("{not json}\n");
        std::fs::write(&path, content).unwrap();

        let out = store.query("t", &RecordFilter::all()).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].qubit, 3);
    }

    #[tokio::test]
    async fn test_json_store_values_read_back_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();

        let written: Vec<HistoryRecord> = (0..500u32)
            .map(|q| HistoryRecord {
                std_dev: (q as f64 + 0.5).sqrt() * 1e-7 / 3.0,
                ..record(q, (1.0 + q as f64 / 7.0).ln() * 1.1e-5 + 1e-6)
            })
            .collect();
        for r in &written {
            store.append("T1History", r).await.unwrap();
        }

        let read = store.query("T1History", &RecordFilter::all()).await.unwrap();
        assert_eq!(read.len(), written.len());
        for (w, r) in written.iter().zip(&read) {
            assert_eq!(w.qubit, r.qubit);
            assert_eq!(w.value.to_bits(), r.value.to_bits(), "qubit {}", w.qubit);
            assert_eq!(w.std_dev.to_bits(), r.std_dev.to_bits(), "qubit {}", w.qubit);
            assert_eq!(w.timestamp, r.timestamp);
        }
    }

    #[tokio::test]
    async fn test_json_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonStore::new(dir.path()).await.unwrap();
            store.append("t", &record(0, 1e-4)).await.unwrap();
        }
        let reopened = JsonStore::new(dir.path()).await.unwrap();
        assert_eq!(reopened.query("t", &RecordFilter::all()).await.unwrap().len(), 1);
    }
}
