//! History records and query filters.

use chrono::{DateTime, Utc};
use qqms_hal::DecayModel;
use serde::{Deserialize, Serialize};

/// One persisted measurement: a fitted decay constant for a qubit at a time.
///
/// Records are append-only. The store key is `(qubit, timestamp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Physical qubit index.
    pub qubit: u32,
    /// Wall-clock time the record was written.
    pub timestamp: DateTime<Utc>,
    /// Fitted value in seconds.
    pub value: f64,
    /// One-sigma uncertainty in seconds.
    pub std_dev: f64,
    /// Which constant `value` is.
    pub model: DecayModel,
}

impl HistoryRecord {
    /// Store key for this record.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            qubit: self.qubit,
            timestamp: self.timestamp,
        }
    }
}

/// Composite key of a [`HistoryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    /// Physical qubit index.
    pub qubit: u32,
    /// Record timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Filter for [`TimeSeriesStore::query`](crate::TimeSeriesStore::query).
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Only this qubit.
    pub qubit: Option<u32>,
    /// Only this model kind.
    pub model: Option<DecayModel>,
    /// Only records at or after this time.
    pub since: Option<DateTime<Utc>>,
    /// Keep at most this many records (the most recent ones).
    pub limit: Option<usize>,
}

impl RecordFilter {
    /// Match everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one qubit.
    pub fn qubit(mut self, qubit: u32) -> Self {
        self.qubit = Some(qubit);
        self
    }

    /// Restrict to one model kind.
    pub fn model(mut self, model: DecayModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Restrict to records at or after `since`.
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Keep only the `limit` most recent records.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `record` passes the qubit/model/time predicates.
    pub fn matches(&self, record: &HistoryRecord) -> bool {
        self.qubit.is_none_or(|q| record.qubit == q)
            && self.model.is_none_or(|m| record.model == m)
            && self.since.is_none_or(|t| record.timestamp >= t)
    }

    /// Filter, order by `(qubit, timestamp)` and apply the limit.
    pub(crate) fn apply(&self, records: impl IntoIterator<Item = HistoryRecord>) -> Vec<HistoryRecord> {
        let mut out: Vec<_> = records.into_iter().filter(|r| self.matches(r)).collect();
        out.sort_by_key(HistoryRecord::key);
        if let Some(limit) = self.limit {
            if out.len() > limit {
                // Most recent first by time, then restore key order.
                out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                out.truncate(limit);
                out.sort_by_key(HistoryRecord::key);
            }
        }
        out
    }
}
