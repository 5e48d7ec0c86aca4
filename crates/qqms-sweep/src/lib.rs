//! QQMS Sweep
//!
//! Delay-sweep calibration of per-qubit decoherence constants.
//!
//! # Pipeline
//!
//! ```text
//! SweepConfig
//!   ├─ DelayGridBuilder   one delay grid per qubit
//!   ├─ BackendResolver    local noisy simulator | remote device
//!   ├─ SweepOrchestrator  one experiment per qubit, in qubit order
//!   │    └─ ResultExtractor   fitted value or absent
//!   └─ HistoryWriter      one record per fitted qubit
//! ```
//!
//! [`CalibrationPipeline`] wires these together. The pieces are also usable
//! on their own, e.g. to sweep a backend the caller already holds.
//!
//! # Example
//!
//! ```ignore
//! use qqms_sweep::{CalibrationPipeline, SweepConfig, open_store};
//!
//! let config = SweepConfig::from_file("sweep.yaml")?;
//! let store = open_store(&config.store).await?;
//! let pipeline = CalibrationPipeline::new(resolver, profile, store);
//! let summary = pipeline.run(&config).await?;
//! for (qubit, outcome) in summary.report.series.iter() {
//!     println!("{qubit}: {:?}", outcome.value());
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod grid;
pub mod orchestrator;
pub mod outcome;
pub mod pipeline;
pub mod resolver;

pub use config::{StoreSpec, SweepConfig, open_store, state_dir};
pub use error::{SweepError, SweepResult};
pub use extract::ResultExtractor;
pub use grid::DelayGridBuilder;
pub use orchestrator::{FailurePolicy, SweepObserver, SweepOrchestrator};
pub use outcome::{MeasurementOutcome, QubitFailure, ResultSeries, SweepReport};
pub use pipeline::{CalibrationPipeline, CalibrationSummary};
pub use resolver::BackendResolver;
