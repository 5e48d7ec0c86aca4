//! QQMS Hardware Abstraction Layer
//!
//! This crate provides the execution contract shared by every backend that
//! can run a delay-sweep calibration experiment, whether a local noisy
//! simulator or a remote device reached through an execution service.
//!
//! # Overview
//!
//! - A common [`ExecutionBackend`] trait for experiment submission and polling
//! - [`ExperimentDescriptor`] binding a qubit, a [`DecayModel`] and a [`DelayGrid`]
//! - [`CompletedRun`] carrying named [`AnalysisResult`]s
//! - [`DeviceProfile`] / [`NoiseModel`] / [`NoiseModelProvider`] for simulated backends
//! - [`ExecutionService`] / [`Credentials`] for remote backends
//!
//! # Example: Running one sweep point set
//!
//! ```ignore
//! use qqms_hal::{DecayModel, DelayGrid, ExecutionBackend, ExperimentDescriptor};
//!
//! let grid = DelayGrid::from_values(vec![0.0, 1e-5, 2e-5, 4e-5])?;
//! let experiment = ExperimentDescriptor::new(0, DecayModel::Relaxation, grid);
//!
//! let run = backend.run(&experiment).await?;
//! if let Some(t1) = run.analysis_result("T1") {
//!     println!("T1 = {} ± {}", t1.value.nominal, t1.value.std_dev);
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod experiment;
pub mod job;
pub mod noise;
pub mod result;
pub mod service;

pub use backend::{BackendAvailability, DEFAULT_POLL_INTERVAL, ExecutionBackend, SimulatorFactory};
pub use capability::{Capabilities, NoiseProfile};
pub use error::{HalError, HalResult};
pub use experiment::{DEFAULT_SHOTS, DecayModel, DelayGrid, ExperimentDescriptor, SchedulingMethod};
pub use job::{JobId, JobStatus};
pub use noise::{
    DeviceProfile, NoiseModel, NoiseModelProvider, NoiseOptions, QubitNoise, QubitProperties,
};
pub use result::{AnalysisResult, CompletedRun, FitQuality, UncertainValue};
pub use service::{Credentials, ExecutionService, ServiceSession};
