//! Stub collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use qqms_hal::{
    AnalysisResult, BackendAvailability, Capabilities, CompletedRun, Credentials, DecayModel,
    DeviceProfile, ExecutionBackend, ExecutionService, ExperimentDescriptor, HalError, HalResult,
    JobId, JobStatus, NoiseModel, NoiseModelProvider, NoiseOptions, QubitNoise, QubitProperties,
    ServiceSession, SimulatorFactory,
};
use qqms_history::{
    HistoryError, HistoryRecord, HistoryResult, MemoryStore, RecordFilter, TimeSeriesStore,
};
use qqms_sweep::BackendResolver;

/// What the stub does for one qubit.
#[derive(Debug, Clone, Copy)]
pub enum StubOutcome {
    Fit(f64, f64),
    NoFit,
    Fail,
}

/// Backend answering each qubit from a fixed table. Qubits not in the
/// table fit to `(qubit + 1) * 1e-6 ± 1e-8`.
pub struct StubBackend {
    caps: Capabilities,
    table: HashMap<u32, StubOutcome>,
    pub submitted: Arc<Mutex<Vec<ExperimentDescriptor>>>,
}

impl StubBackend {
    pub fn new(num_qubits: u32) -> Self {
        Self {
            caps: Capabilities::simulator("stub", num_qubits),
            table: HashMap::new(),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with(mut self, qubit: u32, outcome: StubOutcome) -> Self {
        self.table.insert(qubit, outcome);
        self
    }

    pub fn default_fit(qubit: u32) -> (f64, f64) {
        ((qubit + 1) as f64 * 1e-6, 1e-8)
    }

    pub fn submitted_qubits(&self) -> Vec<u32> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.qubit())
            .collect()
    }
}

#[async_trait]
impl ExecutionBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn submit(&self, experiment: &ExperimentDescriptor) -> HalResult<JobId> {
        let qubit = experiment.qubit();
        self.submitted.lock().unwrap().push(experiment.clone());
        if let Some(StubOutcome::Fail) = self.table.get(&qubit) {
            return Err(HalError::SubmissionFailed(format!("qubit {qubit} rejected")));
        }
        Ok(JobId::new(format!(
            "{qubit}:{}",
            experiment.model().sequence_name()
        )))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        Ok(JobStatus::Completed)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<CompletedRun> {
        let (qubit, sequence) = job_id
            .0
            .split_once(':')
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        let qubit: u32 = qubit
            .parse()
            .map_err(|_| HalError::JobNotFound(job_id.0.clone()))?;
        let model: DecayModel = sequence.parse()?;

        let run = CompletedRun::new(job_id.clone(), qubit, model);
        let fit = match self.table.get(&qubit) {
            Some(StubOutcome::Fit(v, s)) => Some((*v, *s)),
            Some(StubOutcome::NoFit) => None,
            Some(StubOutcome::Fail) => unreachable!("failed qubits never complete"),
            None => Some(Self::default_fit(qubit)),
        };
        Ok(match fit {
            Some((v, s)) => run.with_result(AnalysisResult::new(model.result_name(), v, s)),
            None => run,
        })
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

/// Noise provider producing an empty thermal model and counting calls.
#[derive(Default)]
pub struct StubNoise {
    pub calls: AtomicUsize,
}

impl NoiseModelProvider for StubNoise {
    fn derive(&self, profile: &DeviceProfile, options: NoiseOptions) -> HalResult<NoiseModel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(NoiseModel {
            source: profile.name.clone(),
            options,
            qubits: vec![QubitNoise::default(); profile.qubits.len()],
            gate_error: None,
            readout_error: None,
        })
    }
}

/// Factory handing out a prepared [`StubBackend`] once.
pub struct StubFactory {
    backend: Mutex<Option<StubBackend>>,
}

impl StubFactory {
    pub fn new(backend: StubBackend) -> Self {
        Self {
            backend: Mutex::new(Some(backend)),
        }
    }
}

impl SimulatorFactory for StubFactory {
    fn create(
        &self,
        profile: &DeviceProfile,
        _noise: NoiseModel,
    ) -> HalResult<Box<dyn ExecutionBackend>> {
        match self.backend.lock().unwrap().take() {
            Some(backend) => Ok(Box::new(backend)),
            None => Ok(Box::new(StubBackend::new(profile.num_qubits()))),
        }
    }
}

struct KnownDevices(Vec<String>);

#[async_trait]
impl ServiceSession for KnownDevices {
    async fn backend(&self, backend_id: &str) -> HalResult<Box<dyn ExecutionBackend>> {
        if self.0.iter().any(|id| id == backend_id) {
            Ok(Box::new(StubBackend::new(27)))
        } else {
            Err(HalError::BackendUnavailable(format!(
                "backend '{backend_id}' does not exist"
            )))
        }
    }

    async fn list_backends(&self) -> HalResult<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Execution service that records every call. Accepts the token `"valid"`
/// and knows one device, `device_a`.
#[derive(Default)]
pub struct CountingService {
    pub calls: AtomicUsize,
}

impl CountingService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionService for CountingService {
    fn name(&self) -> &str {
        "counting"
    }

    async fn authenticate(&self, credentials: &Credentials) -> HalResult<Box<dyn ServiceSession>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if credentials.token() != "valid" {
            return Err(HalError::AuthenticationFailed("token rejected".into()));
        }
        Ok(Box::new(KnownDevices(vec!["device_a".into()])))
    }
}

/// Store that rejects writes for chosen qubits and forwards the rest.
pub struct FlakyStore {
    inner: MemoryStore,
    reject: Vec<u32>,
}

impl FlakyStore {
    pub fn rejecting(reject: Vec<u32>) -> Self {
        Self {
            inner: MemoryStore::new(),
            reject,
        }
    }
}

#[async_trait]
impl TimeSeriesStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn append(&self, table: &str, record: &HistoryRecord) -> HistoryResult<()> {
        if self.reject.contains(&record.qubit) {
            return Err(HistoryError::Persistence(format!(
                "write for qubit {} refused",
                record.qubit
            )));
        }
        self.inner.append(table, record).await
    }

    async fn query(&self, table: &str, filter: &RecordFilter) -> HistoryResult<Vec<HistoryRecord>> {
        self.inner.query(table, filter).await
    }
}

pub fn profile(num_qubits: usize) -> DeviceProfile {
    DeviceProfile {
        name: format!("reference_{num_qubits}q"),
        qubits: vec![
            QubitProperties {
                t1: Some(100e-6),
                t2: Some(80e-6),
                frequency: Some(5e9),
            };
            num_qubits
        ],
        gate_error: Some(1e-3),
        readout_error: Some(2e-2),
    }
}

pub fn resolver(
    noise: Arc<StubNoise>,
    factory: StubFactory,
    service: Arc<CountingService>,
) -> BackendResolver {
    BackendResolver::new(noise, Arc::new(factory), service)
}
