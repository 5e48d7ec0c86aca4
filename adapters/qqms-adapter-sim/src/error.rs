//! Error types for the simulator adapter.

use thiserror::Error;

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the local noisy simulator.
#[derive(Debug, Error)]
pub enum SimError {
    /// Reference profile describes no qubits.
    #[error("Device profile '{0}' has no qubits")]
    EmptyProfile(String),

    /// Noise model and profile disagree on device size.
    #[error("Noise model covers {model} qubits but profile '{profile}' has {expected}")]
    ProfileMismatch {
        /// Profile name.
        profile: String,
        /// Qubits in the profile.
        expected: u32,
        /// Qubits in the noise model.
        model: u32,
    },

    /// Shot count outside the simulator's range.
    #[error("Shots must be between 1 and {max}, got {shots}")]
    InvalidShots {
        /// Requested shots.
        shots: u32,
        /// Maximum supported.
        max: u32,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Profile file could not be read.
    #[error("Failed to read device profile: {0}")]
    ProfileIo(#[from] std::io::Error),

    /// Profile file is not valid JSON.
    #[error("Invalid device profile: {0}")]
    ProfileParse(#[from] serde_json::Error),
}

impl From<SimError> for qqms_hal::HalError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::EmptyProfile(_) | SimError::ProfileMismatch { .. } => {
                qqms_hal::HalError::NoiseModel(e.to_string())
            }
            SimError::InvalidShots { .. } => qqms_hal::HalError::InvalidExperiment(e.to_string()),
            SimError::JobNotFound(id) => qqms_hal::HalError::JobNotFound(id),
            SimError::ProfileIo(_) | SimError::ProfileParse(_) => {
                qqms_hal::HalError::Configuration(e.to_string())
            }
        }
    }
}
