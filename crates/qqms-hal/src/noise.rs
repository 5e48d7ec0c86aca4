//! Reference device profiles and derived noise models.
//!
//! A [`DeviceProfile`] is the reference description a simulated backend is
//! built from: per-qubit coherence constants plus aggregate gate and
//! readout error. A [`NoiseModelProvider`] turns a profile into a
//! [`NoiseModel`], keeping only the error channels selected in
//! [`NoiseOptions`].

use serde::{Deserialize, Serialize};

use crate::error::HalResult;

/// Per-qubit properties of a reference device. Times are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QubitProperties {
    /// T1 relaxation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1: Option<f64>,
    /// T2 dephasing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t2: Option<f64>,
    /// Resonance frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
}

/// Reference device a noise model is derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Device name.
    pub name: String,
    /// Properties indexed by physical qubit.
    pub qubits: Vec<QubitProperties>,
    /// Average single-qubit gate error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_error: Option<f64>,
    /// Average readout assignment error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readout_error: Option<f64>,
}

impl DeviceProfile {
    /// Number of qubits described.
    pub fn num_qubits(&self) -> u32 {
        u32::try_from(self.qubits.len()).unwrap_or(u32::MAX)
    }
}

/// Which error channels a derived noise model keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseOptions {
    /// Keep T1/T2 thermal relaxation.
    pub thermal_relaxation: bool,
    /// Keep gate error.
    pub gate_error: bool,
    /// Keep readout error.
    pub readout_error: bool,
}

impl NoiseOptions {
    /// Thermal relaxation only: sweeps see T1/T2 decay and nothing else.
    pub fn thermal_only() -> Self {
        Self {
            thermal_relaxation: true,
            gate_error: false,
            readout_error: false,
        }
    }
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self::thermal_only()
    }
}

/// Coherence constants a simulator applies to one qubit. Seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QubitNoise {
    /// Relaxation constant, if modelled.
    pub t1: Option<f64>,
    /// Dephasing constant, if modelled.
    pub t2: Option<f64>,
}

/// Noise characterisation derived from a [`DeviceProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Name of the profile this model was derived from.
    pub source: String,
    /// Channels kept during derivation.
    pub options: NoiseOptions,
    /// Per-qubit coherence, indexed by physical qubit.
    pub qubits: Vec<QubitNoise>,
    /// Gate error, present only when `options.gate_error`.
    pub gate_error: Option<f64>,
    /// Readout error, present only when `options.readout_error`.
    pub readout_error: Option<f64>,
}

impl NoiseModel {
    /// Coherence constants for `qubit`, if it exists.
    pub fn qubit(&self, qubit: u32) -> Option<&QubitNoise> {
        self.qubits.get(qubit as usize)
    }

    /// Number of qubits the model covers.
    pub fn num_qubits(&self) -> u32 {
        u32::try_from(self.qubits.len()).unwrap_or(u32::MAX)
    }
}

/// Derives simulation noise from a reference device profile.
pub trait NoiseModelProvider: Send + Sync {
    /// Build a noise model from `profile` keeping only the channels in `options`.
    fn derive(&self, profile: &DeviceProfile, options: NoiseOptions) -> HalResult<NoiseModel>;
}
