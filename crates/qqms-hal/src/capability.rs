//! Backend capability introspection.
//!
//! Describes what a backend can run: qubit count, shot limits, the decay
//! models it can characterise, and device-wide coherence averages.
//! Orchestrators read these before submitting; they are cached at
//! backend construction and never require I/O.

use serde::{Deserialize, Serialize};

use crate::experiment::DecayModel;
use crate::noise::NoiseModel;

/// Hardware capabilities of an execution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Maximum number of shots per delay point.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Decay models the backend can characterise.
    pub models: Vec<DecayModel>,
    /// Device-wide coherence averages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_profile: Option<NoiseProfile>,
}

impl Capabilities {
    /// Capabilities for a local simulated backend.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            max_shots: 100_000,
            is_simulator: true,
            models: DecayModel::ALL.to_vec(),
            noise_profile: None,
        }
    }

    /// Capabilities for a remote device reached through an execution service.
    pub fn remote(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            max_shots: 100_000,
            is_simulator: false,
            models: DecayModel::ALL.to_vec(),
            noise_profile: None,
        }
    }

    /// Attach a noise profile.
    pub fn with_noise_profile(mut self, profile: NoiseProfile) -> Self {
        self.noise_profile = Some(profile);
        self
    }

    /// Whether `model` can be measured on this backend.
    pub fn supports(&self, model: DecayModel) -> bool {
        self.models.contains(&model)
    }

    /// Whether `qubit` is a valid physical index.
    pub fn has_qubit(&self, qubit: u32) -> bool {
        qubit < self.num_qubits
    }
}

/// Device-wide coherence averages, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseProfile {
    /// Mean T1 across qubits that report one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1: Option<f64>,
    /// Mean T2 across qubits that report one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t2: Option<f64>,
}

impl NoiseProfile {
    /// Average the per-qubit constants of a noise model.
    pub fn from_model(model: &NoiseModel) -> Self {
        Self {
            t1: mean(model.qubits.iter().filter_map(|q| q.t1)),
            t2: mean(model.qubits.iter().filter_map(|q| q.t2)),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{NoiseOptions, QubitNoise};

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator("noisy_simulator", 5);
        assert!(caps.is_simulator);
        assert!(caps.supports(DecayModel::Relaxation));
        assert!(caps.supports(DecayModel::Dephasing));
        assert!(caps.has_qubit(4));
        assert!(!caps.has_qubit(5));
    }

    #[test]
    fn test_noise_profile_skips_missing() {
        let model = NoiseModel {
            source: "test".into(),
            options: NoiseOptions::thermal_only(),
            qubits: vec![
                QubitNoise {
                    t1: Some(100e-6),
                    t2: None,
                },
                QubitNoise {
                    t1: Some(50e-6),
                    t2: Some(40e-6),
                },
            ],
            gate_error: None,
            readout_error: None,
        };
        let profile = NoiseProfile::from_model(&model);
        assert!((profile.t1.unwrap() - 75e-6).abs() < 1e-12);
        assert_eq!(profile.t2, Some(40e-6));
    }

    #[test]
    fn test_noise_profile_empty() {
        let model = NoiseModel {
            source: "empty".into(),
            options: NoiseOptions::thermal_only(),
            qubits: vec![],
            gate_error: None,
            readout_error: None,
        };
        assert_eq!(NoiseProfile::from_model(&model), NoiseProfile::default());
    }
}
