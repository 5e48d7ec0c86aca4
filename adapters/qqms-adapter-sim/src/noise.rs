//! Noise-model derivation from a reference profile.

use qqms_hal::{
    DeviceProfile, HalResult, NoiseModel, NoiseModelProvider, NoiseOptions, QubitNoise,
};
use tracing::{debug, warn};

use crate::error::SimError;

/// Derives thermal-relaxation noise from per-qubit T1/T2.
///
/// T2 is clamped to `2 * T1`. Constants that are missing, non-finite or
/// non-positive are left out of the model for that qubit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThermalNoiseProvider;

impl ThermalNoiseProvider {
    /// Create a provider.
    pub fn new() -> Self {
        Self
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl NoiseModelProvider for ThermalNoiseProvider {
    fn derive(&self, profile: &DeviceProfile, options: NoiseOptions) -> HalResult<NoiseModel> {
        if profile.qubits.is_empty() {
            return Err(SimError::EmptyProfile(profile.name.clone()).into());
        }

        let qubits = profile
            .qubits
            .iter()
            .enumerate()
            .map(|(i, props)| {
                if !options.thermal_relaxation {
                    return QubitNoise::default();
                }
                let t1 = usable(props.t1);
                let mut t2 = usable(props.t2);
                if let (Some(t1), Some(t2v)) = (t1, t2) {
                    if t2v > 2.0 * t1 {
                        warn!(qubit = i, t1, t2 = t2v, "T2 exceeds 2*T1, clamping");
                        t2 = Some(2.0 * t1);
                    }
                }
                QubitNoise { t1, t2 }
            })
            .collect();

        let model = NoiseModel {
            source: profile.name.clone(),
            options,
            qubits,
            gate_error: profile.gate_error.filter(|_| options.gate_error),
            readout_error: profile.readout_error.filter(|_| options.readout_error),
        };
        debug!(
            source = %model.source,
            qubits = model.num_qubits(),
            "derived noise model"
        );
        Ok(model)
    }
}
