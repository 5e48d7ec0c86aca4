//! Error handling for sweep orchestration.

use qqms_hal::HalError;
use qqms_history::HistoryError;
use thiserror::Error;

/// Result type for sweep operations.
pub type SweepResult<T> = Result<T, SweepError>;

/// Errors that can occur while running a calibration sweep.
///
/// A qubit whose decay curve could not be fitted is not an error: it shows
/// up as an absent [`MeasurementOutcome`](crate::MeasurementOutcome).
#[derive(Error, Debug)]
pub enum SweepError {
    /// Malformed delay bounds, qubit count or other configuration.
    /// Raised before any backend interaction.
    #[error("Invalid sweep configuration: {0}")]
    InvalidSweepConfig(String),

    /// Backend could not be resolved or authenticated.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// A backend submission failed for one qubit.
    #[error("Execution failed on qubit {qubit}: {source}")]
    ExecutionFailure {
        /// Physical qubit index.
        qubit: u32,
        /// Backend error.
        #[source]
        source: HalError,
    },

    /// A history record could not be written.
    #[error("Persistence error: {0}")]
    Persistence(#[from] HistoryError),

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    ConfigFile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_failure_display() {
        let err = SweepError::ExecutionFailure {
            qubit: 3,
            source: HalError::JobFailed("readout timeout".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("qubit 3"));
        assert!(msg.contains("readout timeout"));
    }

    #[test]
    fn test_execution_failure_source() {
        use std::error::Error;
        let err = SweepError::ExecutionFailure {
            qubit: 0,
            source: HalError::JobCancelled,
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_history_error() {
        let err: SweepError = HistoryError::Persistence("table gone".into()).into();
        assert!(matches!(err, SweepError::Persistence(_)));
    }
}
