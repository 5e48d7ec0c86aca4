//! Job handles and status.
//!
//! A submitted experiment moves `Queued → Running` and ends in one of
//! `Completed`, `Failed` or `Cancelled`. [`ExecutionBackend::wait`] polls
//! until it sees one of those and only then reads the run.
//!
//! [`ExecutionBackend::wait`]: crate::ExecutionBackend::wait

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned handle of a submitted experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Where a submitted experiment is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    /// The backend gave up on the experiment, with its reason.
    Failed(String),
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_conversions() {
        let a = JobId::new("q3-t1");
        let b: JobId = "q3-t1".into();
        let c: JobId = String::from("q3-t1").into();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_string(), "q3-t1");
    }

    #[test]
    fn test_failed_status_serializes_reason() {
        let json = serde_json::to_string(&JobStatus::Failed("readout crashed".into())).unwrap();
        assert_eq!(json, r#"{"Failed":"readout crashed"}"#);
        let back: JobStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, JobStatus::Failed("readout crashed".into()));
    }
}
