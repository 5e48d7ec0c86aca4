//! SQLite-based persistence for production use.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::error::{HistoryError, HistoryResult, validate_table};
use crate::record::{HistoryRecord, RecordFilter};
use crate::store::TimeSeriesStore;

/// SQLite-based time-series store.
///
/// All tables share one `history` relation keyed by
/// `(table_id, qubit, timestamp)`. Timestamps are stored as fixed-width
/// RFC 3339 strings so lexical order is time order.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    pub fn new(path: impl AsRef<Path>) -> HistoryResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create a new in-memory SQLite store.
    pub fn in_memory() -> HistoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> HistoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                table_id TEXT NOT NULL,
                qubit INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                model TEXT NOT NULL,
                value REAL NOT NULL,
                std_dev REAL NOT NULL,
                PRIMARY KEY (table_id, qubit, timestamp)
            );

            CREATE INDEX IF NOT EXISTS idx_history_model ON history(table_id, model);
            CREATE INDEX IF NOT EXISTS idx_history_timestamp ON history(table_id, timestamp);
            "#,
        )?;
        Ok(())
    }
}

fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[async_trait]
impl TimeSeriesStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, table: &str, record: &HistoryRecord) -> HistoryResult<()> {
        validate_table(table)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        let model = serde_json::to_value(record.model)?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO history (table_id, qubit, timestamp, model, value, std_dev)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            rusqlite::params![
                table,
                record.qubit,
                encode_timestamp(&record.timestamp),
                model.as_str().unwrap_or_default(),
                record.value,
                record.std_dev,
            ],
        )?;

        Ok(())
    }

    async fn query(&self, table: &str, filter: &RecordFilter) -> HistoryResult<Vec<HistoryRecord>> {
        validate_table(table)?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let mut sql = String::from(
            "SELECT qubit, timestamp, model, value, std_dev FROM history WHERE table_id = ?1",
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(table.to_string())];

        if let Some(qubit) = filter.qubit {
            let idx = params.len() + 1;
            sql.push_str(&format!(" AND qubit = ?{idx}"));
            params.push(Box::new(qubit));
        }

        if let Some(since) = filter.since {
            let idx = params.len() + 1;
            sql.push_str(&format!(" AND timestamp >= ?{idx}"));
            params.push(Box::new(encode_timestamp(&since)));
        }

        sql.push_str(" ORDER BY qubit ASC, timestamp ASC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|b| b.as_ref()).collect();
        let mut rows = stmt.query(params_refs.as_slice())?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let timestamp: String = row.get(1)?;
            let model: String = row.get(2)?;
            records.push(HistoryRecord {
                qubit: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map_err(|e| HistoryError::DatabaseError(format!("bad timestamp {timestamp}: {e}")))?
                    .with_timezone(&Utc),
                model: serde_json::from_value(serde_json::Value::String(model))?,
                value: row.get(3)?,
                std_dev: row.get(4)?,
            });
        }

        // Model and limit are applied in Rust so all stores share one ordering rule.
        Ok(filter.apply(records))
    }
}
