//! Error types for the runtime adapter.

use thiserror::Error;

/// Result type for runtime service operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur when talking to the execution service.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Token cannot be sent as a header.
    #[error("Invalid API token")]
    InvalidToken,

    /// Token exchange was rejected or failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Service returned an error.
    #[error("Runtime API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Backend does not exist or is offline.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    /// Qubit index outside the device.
    #[error("Qubit {qubit} is outside the device ({available} qubits)")]
    QubitOutOfRange {
        /// Requested qubit.
        qubit: u32,
        /// Qubits on the device.
        available: u32,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<RuntimeError> for qqms_hal::HalError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::InvalidToken | RuntimeError::TokenExchange(_) => {
                qqms_hal::HalError::AuthenticationFailed(e.to_string())
            }
            RuntimeError::BackendUnavailable(name) => qqms_hal::HalError::BackendUnavailable(name),
            RuntimeError::JobNotFound(id) => qqms_hal::HalError::JobNotFound(id),
            RuntimeError::JobFailed(msg) => qqms_hal::HalError::JobFailed(msg),
            RuntimeError::JobCancelled(_) => qqms_hal::HalError::JobCancelled,
            RuntimeError::QubitOutOfRange { .. } => {
                qqms_hal::HalError::InvalidExperiment(e.to_string())
            }
            RuntimeError::HttpError(err) => qqms_hal::HalError::Network(err),
            RuntimeError::JsonError(err) => qqms_hal::HalError::Serialization(err),
            RuntimeError::ApiError { .. } => qqms_hal::HalError::Backend(e.to_string()),
        }
    }
}
