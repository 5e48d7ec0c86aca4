//! Sequential per-qubit sweep execution.

use std::sync::Arc;

use qqms_hal::{
    DEFAULT_SHOTS, DecayModel, DelayGrid, ExecutionBackend, ExperimentDescriptor, SchedulingMethod,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{SweepError, SweepResult};
use crate::extract::ResultExtractor;
use crate::outcome::{MeasurementOutcome, QubitFailure, ResultSeries, SweepReport};

/// What to do when a qubit's experiment fails to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure, leave the qubit absent and continue.
    #[default]
    Isolate,
    /// Stop the sweep and return the error, discarding collected outcomes.
    Abort,
}

/// Progress callbacks invoked from the sweep loop.
pub trait SweepObserver: Send + Sync {
    /// A qubit's experiment is about to be submitted.
    fn on_qubit_start(&self, _qubit: u32, _total: u32) {}

    /// A qubit finished, fitted or not.
    fn on_qubit_complete(&self, _qubit: u32, _outcome: &MeasurementOutcome) {}
}

/// Drives one calibration experiment per qubit, in increasing qubit order.
///
/// Only one experiment is outstanding at a time: each qubit's run is
/// awaited to completion before the next is submitted.
#[derive(Clone)]
pub struct SweepOrchestrator {
    policy: FailurePolicy,
    scheduling: SchedulingMethod,
    shots: u32,
    observer: Option<Arc<dyn SweepObserver>>,
}

impl SweepOrchestrator {
    /// Orchestrator with ASAP scheduling and isolated failures.
    pub fn new() -> Self {
        Self {
            policy: FailurePolicy::Isolate,
            scheduling: SchedulingMethod::Asap,
            shots: DEFAULT_SHOTS,
            observer: None,
        }
    }

    /// Set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the instruction scheduling method.
    pub fn with_scheduling(mut self, scheduling: SchedulingMethod) -> Self {
        self.scheduling = scheduling;
        self
    }

    /// Set shots per delay point.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn SweepObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Current failure policy.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run the sweep over qubits `0..num_qubits`.
    ///
    /// `grids[q]` is the delay grid for qubit `q`. The returned series has
    /// exactly `num_qubits` outcomes, index-aligned with physical qubits.
    #[instrument(skip(self, grids, backend), fields(backend = backend.name(), policy = ?self.policy))]
    pub async fn run_sweep(
        &self,
        num_qubits: u32,
        model: DecayModel,
        grids: &[DelayGrid],
        backend: &dyn ExecutionBackend,
    ) -> SweepResult<SweepReport> {
        if num_qubits == 0 {
            return Err(SweepError::InvalidSweepConfig(
                "qubit count must be at least 1".into(),
            ));
        }
        if grids.len() != num_qubits as usize {
            return Err(SweepError::InvalidSweepConfig(format!(
                "{} delay grids for {num_qubits} qubits",
                grids.len()
            )));
        }

        info!(num_qubits, %model, "starting sweep");

        let mut outcomes = Vec::with_capacity(grids.len());
        let mut failures = Vec::new();

        for (qubit, grid) in (0u32..).zip(grids) {
            if let Some(observer) = &self.observer {
                observer.on_qubit_start(qubit, num_qubits);
            }

            let descriptor = ExperimentDescriptor::new(qubit, model, grid.clone())
                .with_scheduling(self.scheduling)
                .with_shots(self.shots);

            let outcome = match backend.run(&descriptor).await {
                Ok(run) => ResultExtractor::extract(&run, model),
                Err(source) => match self.policy {
                    FailurePolicy::Abort => {
                        return Err(SweepError::ExecutionFailure { qubit, source });
                    }
                    FailurePolicy::Isolate => {
                        warn!(qubit, error = %source, "qubit execution failed, continuing sweep");
                        failures.push(QubitFailure {
                            qubit,
                            message: source.to_string(),
                        });
                        MeasurementOutcome::absent()
                    }
                },
            };

            debug!(qubit, value = ?outcome.value(), std_dev = ?outcome.std_dev(), "qubit complete");
            if let Some(observer) = &self.observer {
                observer.on_qubit_complete(qubit, &outcome);
            }
            outcomes.push(outcome);
        }

        let series = ResultSeries::new(model, outcomes);
        info!(
            fitted = series.len() - series.absent_count(),
            absent = series.absent_count(),
            failed = failures.len(),
            "sweep finished"
        );

        Ok(SweepReport { series, failures })
    }
}

impl Default for SweepOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SweepOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepOrchestrator")
            .field("policy", &self.policy)
            .field("scheduling", &self.scheduling)
            .field("shots", &self.shots)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
