//! Execution backend trait.
//!
//! The [`ExecutionBackend`] trait defines the lifecycle for running one
//! calibration experiment:
//!
//! ```text
//!   capabilities() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)      (async)      (async)      (async)
//! ```
//!
//! [`ExecutionBackend::run`] wraps the whole lifecycle into a single call
//! that resolves once the job reaches a terminal state. Callers that need
//! "one experiment at a time" semantics simply await `run` before starting
//! the next one.
//!
//! ## Method table
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `name()` | sync | yes | `&str` |
//! | `capabilities()` | sync | yes | `&Capabilities` |
//! | `availability()` | async | yes | `HalResult<BackendAvailability>` |
//! | `submit()` | async | yes | `HalResult<JobId>` |
//! | `status()` | async | yes | `HalResult<JobStatus>` |
//! | `result()` | async | yes | `HalResult<CompletedRun>` |
//! | `cancel()` | async | yes | `HalResult<()>` |
//! | `poll_interval()` | sync | provided | `Duration` |
//! | `wait()` | async | provided | `HalResult<CompletedRun>` |
//! | `run()` | async | provided | `HalResult<CompletedRun>` |

use std::time::Duration;

use async_trait::async_trait;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::experiment::ExperimentDescriptor;
use crate::job::{JobId, JobStatus};
use crate::noise::{DeviceProfile, NoiseModel};
use crate::result::CompletedRun;

/// Default interval between status polls in [`ExecutionBackend::wait`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Trait for calibration execution backends.
///
/// # Contract
///
/// - `capabilities()` MUST be synchronous and infallible, cached at
///   construction time.
/// - `submit()` MUST NOT mutate the descriptor and MUST return a job in
///   `Queued` state.
/// - `result()` MUST only be called when status is `Completed`.
/// - A completed run whose fit did not converge is still `Ok`; it simply
///   lacks the named analysis result.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    fn capabilities(&self) -> &Capabilities;

    /// Check backend availability.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Submit an experiment for execution.
    async fn submit(&self, experiment: &ExperimentDescriptor) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<CompletedRun>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Interval between status polls.
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Wait for a job to reach a terminal state and return its result.
    ///
    /// Polls at [`poll_interval`](Self::poll_interval) with no upper bound:
    /// a backend that never finishes keeps the caller waiting.
    async fn wait(&self, job_id: &JobId) -> HalResult<CompletedRun> {
        loop {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    tokio::time::sleep(self.poll_interval()).await;
                }
            }
        }
    }

    /// Submit an experiment and wait for its completed run.
    async fn run(&self, experiment: &ExperimentDescriptor) -> HalResult<CompletedRun> {
        let job_id = self.submit(experiment).await?;
        tracing::debug!(
            backend = self.name(),
            qubit = experiment.qubit(),
            job = %job_id,
            "experiment submitted"
        );
        self.wait(&job_id).await
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability for a backend that is always ready (local simulators).
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            status_message: None,
        }
    }

    /// Availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Builds a local simulated backend seeded with a noise model.
pub trait SimulatorFactory: Send + Sync {
    /// Construct a simulator for `profile` applying `noise`.
    fn create(
        &self,
        profile: &DeviceProfile,
        noise: NoiseModel,
    ) -> HalResult<Box<dyn ExecutionBackend>>;
}
