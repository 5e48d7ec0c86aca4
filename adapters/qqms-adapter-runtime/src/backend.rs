//! Remote backend implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qqms_hal::{
    AnalysisResult, BackendAvailability, Capabilities, CompletedRun, DecayModel, ExecutionBackend,
    ExperimentDescriptor, FitQuality, HalResult, JobId, JobStatus,
};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::api::{AnalysisEntry, BackendInfo, JobResultResponse, JobStatusResponse, RuntimeClient};
use crate::error::RuntimeError;

/// Default interval between remote status polls.
pub const DEFAULT_REMOTE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A device reached through the execution service.
pub struct RuntimeBackend {
    /// API client.
    client: Arc<RuntimeClient>,
    /// Target backend name.
    target: String,
    /// Capabilities cached at construction.
    capabilities: Capabilities,
    /// Qubit and model of each submitted job, for building runs.
    submitted: RwLock<FxHashMap<String, (u32, DecayModel)>>,
    poll_interval: Duration,
}

impl RuntimeBackend {
    /// Wrap a backend that the service reported as `info`.
    pub fn new(client: Arc<RuntimeClient>, info: &BackendInfo) -> Self {
        let mut capabilities = Capabilities::remote(info.name.clone(), info.num_qubits);
        if let Some(max) = info.max_shots {
            capabilities.max_shots = max;
        }
        capabilities.is_simulator = info.simulator;

        Self {
            client,
            target: info.name.clone(),
            capabilities,
            submitted: RwLock::new(FxHashMap::default()),
            poll_interval: DEFAULT_REMOTE_POLL_INTERVAL,
        }
    }

    /// Override the status poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Target backend name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Turn a fetched result into a run and forget the job.
    async fn complete(&self, job_id: &JobId, response: &JobResultResponse) -> HalResult<CompletedRun> {
        let (qubit, model) = self
            .submitted
            .write()
            .await
            .remove(&job_id.0)
            .ok_or_else(|| RuntimeError::JobNotFound(job_id.0.clone()))?;
        Ok(to_completed_run(job_id, qubit, model, response))
    }
}

/// Map a service status string onto the job state machine.
pub(crate) fn map_status(status: &JobStatusResponse) -> JobStatus {
    match status.status.to_uppercase().as_str() {
        "QUEUED" | "PENDING" => JobStatus::Queued,
        "VALIDATING" | "RUNNING" => JobStatus::Running,
        "COMPLETED" | "DONE" => JobStatus::Completed,
        "FAILED" | "ERROR" => JobStatus::Failed(
            status
                .error_message()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
        "CANCELLED" => JobStatus::Cancelled,
        _ => JobStatus::Running, // Treat unknown as running
    }
}

/// Convert one reported analysis entry.
///
/// Entries without a finite value are not usable fits. A missing standard
/// error is carried as NaN.
fn to_analysis_result(entry: &AnalysisEntry) -> Option<AnalysisResult> {
    let value = entry.value.filter(|v| v.is_finite())?;
    let stderr = entry.stderr.unwrap_or(f64::NAN);

    let mut result = AnalysisResult::new(entry.name.clone(), value, stderr);
    if let Some(unit) = &entry.unit {
        result.unit = unit.clone();
    }
    if let Some(chisq) = entry.chisq {
        result = result.with_chisq(chisq);
    }
    let quality = match entry.quality.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("good") => FitQuality::Good,
        Some("bad") => FitQuality::Bad,
        _ => FitQuality::Unknown,
    };
    Some(result.with_quality(quality))
}

/// Build a [`CompletedRun`] from a results response.
pub(crate) fn to_completed_run(
    job_id: &JobId,
    qubit: u32,
    model: DecayModel,
    response: &JobResultResponse,
) -> CompletedRun {
    let mut run = CompletedRun::new(job_id.clone(), qubit, model);
    for entry in &response.analysis_results {
        match to_analysis_result(entry) {
            Some(result) => run = run.with_result(result),
            None => debug!(name = %entry.name, "dropping analysis result without value"),
        }
    }
    if let Some(ms) = response.execution_time_ms {
        run = run.with_execution_time(ms);
    }
    run
}

#[async_trait]
impl ExecutionBackend for RuntimeBackend {
    fn name(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.client.get_backend(&self.target).await {
            Ok(info) if info.operational => Ok(BackendAvailability {
                is_available: true,
                queue_depth: info.pending_jobs,
                status_message: info.status_msg,
            }),
            Ok(info) => Ok(BackendAvailability::unavailable(
                info.status_msg
                    .unwrap_or_else(|| "backend offline".to_string()),
            )),
            Err(e) => {
                tracing::warn!("backend availability check failed: {e}");
                Ok(BackendAvailability::unavailable("failed to query backend"))
            }
        }
    }

    #[instrument(skip(self, experiment), fields(backend = %self.target, qubit = experiment.qubit()))]
    async fn submit(&self, experiment: &ExperimentDescriptor) -> HalResult<JobId> {
        if !self.capabilities.has_qubit(experiment.qubit()) {
            return Err(RuntimeError::QubitOutOfRange {
                qubit: experiment.qubit(),
                available: self.capabilities.num_qubits,
            }
            .into());
        }

        let response = self
            .client
            .submit_experiment(&self.target, experiment)
            .await
            .map_err(|e| match e {
                RuntimeError::HttpError(_) | RuntimeError::ApiError { .. } => {
                    qqms_hal::HalError::SubmissionFailed(e.to_string())
                }
                other => other.into(),
            })?;

        self.submitted.write().await.insert(
            response.id.clone(),
            (experiment.qubit(), experiment.model()),
        );
        debug!("Submitted job: {}", response.id);

        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;
        Ok(map_status(&status))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<CompletedRun> {
        if !self.submitted.read().await.contains_key(&job_id.0) {
            return Err(RuntimeError::JobNotFound(job_id.0.clone()).into());
        }

        let response = self.client.get_job_results(&job_id.0).await?;
        self.complete(job_id, &response).await
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
