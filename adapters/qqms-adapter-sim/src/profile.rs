//! Reference device profiles.

use std::path::Path;

use qqms_hal::{DeviceProfile, QubitProperties};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{SimError, SimResult};

/// Relaxation times drawn for the generic profile, seconds.
const T1_RANGE: std::ops::Range<f64> = 50e-6..150e-6;

/// Dephasing time as a fraction of T1 for the generic profile.
const T2_RATIO_RANGE: std::ops::Range<f64> = 0.5..1.5;

/// Qubit frequencies for the generic profile, Hz.
const FREQUENCY_RANGE: std::ops::Range<f64> = 4.8e9..5.2e9;

/// A generic fake device with `num_qubits` qubits.
///
/// Coherence constants are drawn from a `StdRng` seeded with `seed`, so the
/// same arguments always describe the same device.
pub fn generic_profile(num_qubits: u32, seed: u64) -> DeviceProfile {
    let mut rng = StdRng::seed_from_u64(seed);
    let qubits = (0..num_qubits)
        .map(|_| {
            let t1 = rng.gen_range(T1_RANGE);
            let t2 = t1 * rng.gen_range(T2_RATIO_RANGE);
            QubitProperties {
                t1: Some(t1),
                t2: Some(t2),
                frequency: Some(rng.gen_range(FREQUENCY_RANGE)),
            }
        })
        .collect();

    DeviceProfile {
        name: format!("generic_{num_qubits}q"),
        qubits,
        gate_error: Some(1e-3),
        readout_error: Some(2e-2),
    }
}

/// Load a device profile from a JSON file.
pub fn load_profile(path: impl AsRef<Path>) -> SimResult<DeviceProfile> {
    let content = std::fs::read_to_string(path)?;
    let profile: DeviceProfile = serde_json::from_str(&content)?;
    if profile.qubits.is_empty() {
        return Err(SimError::EmptyProfile(profile.name));
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_profile_is_reproducible() {
        let a = generic_profile(5, 42);
        let b = generic_profile(5, 42);
        assert_eq!(a, b);
        assert_ne!(a, generic_profile(5, 43));
        assert_eq!(a.name, "generic_5q");
    }

    #[test]
    fn test_generic_profile_ranges() {
        let profile = generic_profile(64, 7);
        assert_eq!(profile.num_qubits(), 64);
        for q in &profile.qubits {
            let t1 = q.t1.unwrap();
            let t2 = q.t2.unwrap();
            assert!(T1_RANGE.contains(&t1));
            assert!(t2 >= 0.5 * t1 && t2 <= 1.5 * t1);
        }
    }

    #[test]
    fn test_load_profile_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        let profile = generic_profile(3, 1);
        std::fs::write(&path, serde_json::to_string_pretty(&profile).unwrap()).unwrap();

        let loaded = load_profile(&path).unwrap();
        assert_eq!(loaded.num_qubits(), 3);
        assert_eq!(loaded.name, profile.name);
    }

    #[test]
    fn test_load_profile_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"name":"empty","qubits":[]}"#).unwrap();
        assert!(matches!(load_profile(&path), Err(SimError::EmptyProfile(_))));
    }

    #[test]
    fn test_load_profile_missing_file() {
        let err = load_profile("/nonexistent/qqms/device.json").unwrap_err();
        assert!(matches!(err, SimError::ProfileIo(_)));
    }
}
