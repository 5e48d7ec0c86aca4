//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Backend is not available (unknown name, offline, or unreachable).
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Authentication against an execution service failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Experiment submission failed.
    #[error("Experiment submission failed: {0}")]
    SubmissionFailed(String),

    /// Job execution failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job cancelled")]
    JobCancelled,

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Experiment descriptor is not valid for this backend.
    #[error("Invalid experiment: {0}")]
    InvalidExperiment(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Noise model could not be derived from a device profile.
    #[error("Noise model error: {0}")]
    NoiseModel(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
