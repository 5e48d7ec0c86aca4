//! Timestamped record writer.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use qqms_hal::DecayModel;
use tracing::{debug, instrument};

use crate::error::{HistoryError, HistoryResult};
use crate::record::HistoryRecord;
use crate::store::TimeSeriesStore;

/// Appends timestamped measurements to a [`TimeSeriesStore`].
///
/// Timestamps issued by one writer are strictly increasing: if the wall
/// clock has not moved past the previous timestamp, the new one is the
/// previous plus one microsecond. Two writes for the same qubit therefore
/// always land on distinct keys.
#[derive(Debug, Default)]
pub struct HistoryWriter {
    last_issued: Mutex<Option<DateTime<Utc>>>,
}

impl HistoryWriter {
    /// Create a writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let mut last = self
            .last_issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let ts = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(ts);
        ts
    }

    /// Write one measurement for `qubit` into `table_id`.
    ///
    /// Callers pass only fitted outcomes. A failure affects this record
    /// only; the writer stays usable for the next one.
    #[instrument(skip(self, store), fields(store = store.name()))]
    pub async fn record(
        &self,
        table_id: &str,
        qubit: u32,
        value: f64,
        std_dev: f64,
        model: DecayModel,
        store: &dyn TimeSeriesStore,
    ) -> HistoryResult<HistoryRecord> {
        if !value.is_finite() || !std_dev.is_finite() {
            return Err(HistoryError::InvalidRecord(format!(
                "qubit {qubit}: non-finite {model} value {value} ± {std_dev}"
            )));
        }

        let record = HistoryRecord {
            qubit,
            timestamp: self.next_timestamp(),
            value,
            std_dev,
            model,
        };
        store.append(table_id, &record).await?;
        debug!(qubit, %model, timestamp = %record.timestamp, "history record written");

        Ok(record)
    }
}
