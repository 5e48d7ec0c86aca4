//! QQMS Local Noisy Simulator
//!
//! This crate provides a local stand-in for a calibration device. It does
//! not simulate circuits: for each experiment it samples the exponential
//! decay implied by a thermal noise model, adds binomial shot noise, and
//! fits the samples to report a time constant with its uncertainty.
//!
//! # Components
//!
//! | Item | Role |
//! |------|------|
//! | [`ThermalNoiseProvider`] | `DeviceProfile` → thermal-only `NoiseModel` |
//! | [`NoisySimulator`] | `ExecutionBackend` over a noise model |
//! | [`NoisySimulatorFactory`] | `SimulatorFactory` used by backend resolution |
//! | [`generic_profile`] | seeded generic reference device |
//!
//! # Example
//!
//! ```ignore
//! use qqms_adapter_sim::{NoisySimulator, ThermalNoiseProvider, generic_profile};
//! use qqms_hal::{DecayModel, DelayGrid, ExecutionBackend, ExperimentDescriptor};
//! use qqms_hal::{NoiseModelProvider, NoiseOptions};
//!
//! let profile = generic_profile(5, 42);
//! let noise = ThermalNoiseProvider.derive(&profile, NoiseOptions::thermal_only())?;
//! let backend = NoisySimulator::with_seed(&profile, noise, 42);
//!
//! let grid = DelayGrid::from_values((0..50).map(|i| i as f64 * 1e-5).collect())?;
//! let run = backend
//!     .run(&ExperimentDescriptor::new(0, DecayModel::Relaxation, grid))
//!     .await?;
//! println!("{:?}", run.analysis_result("T1"));
//! ```

mod error;
pub mod fit;
mod noise;
mod profile;
mod simulator;

pub use error::{SimError, SimResult};
pub use noise::ThermalNoiseProvider;
pub use profile::{generic_profile, load_profile};
pub use simulator::{NoisySimulator, NoisySimulatorFactory};
