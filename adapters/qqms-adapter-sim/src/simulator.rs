//! Noisy simulator backend implementation.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use qqms_hal::{
    AnalysisResult, BackendAvailability, Capabilities, CompletedRun, DecayModel, DeviceProfile,
    ExecutionBackend, ExperimentDescriptor, FitQuality, HalResult, JobId, JobStatus,
    NoiseModel, NoiseProfile, SimulatorFactory,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::SimError;
use crate::fit::{DecayPoint, fit_exponential_decay};

/// Reduced chi-squared above which a fit is flagged [`FitQuality::Bad`].
const GOOD_FIT_CHISQ: f64 = 3.0;

/// Local simulated backend that applies a thermal noise model.
///
/// Each experiment samples the decay curve of its qubit at every delay with
/// binomial shot noise and fits the samples. Runs complete during
/// `submit`, so the first status poll already reports `Completed`. A run is
/// held until its result is read once.
pub struct NoisySimulator {
    name: String,
    caps: Capabilities,
    noise: NoiseModel,
    rng: Mutex<StdRng>,
    finished: Arc<Mutex<FxHashMap<String, CompletedRun>>>,
}

impl NoisySimulator {
    /// Create a simulator for `profile` applying `noise`, seeded from entropy.
    pub fn new(profile: &DeviceProfile, noise: NoiseModel) -> Self {
        Self::build(profile, noise, StdRng::from_entropy())
    }

    /// Create a reproducible simulator.
    pub fn with_seed(profile: &DeviceProfile, noise: NoiseModel, seed: u64) -> Self {
        Self::build(profile, noise, StdRng::seed_from_u64(seed))
    }

    fn build(profile: &DeviceProfile, noise: NoiseModel, rng: StdRng) -> Self {
        let name = format!("noisy_{}", profile.name);
        let caps = Capabilities::simulator(name.clone(), noise.num_qubits())
            .with_noise_profile(NoiseProfile::from_model(&noise));
        Self {
            name,
            caps,
            noise,
            rng: Mutex::new(rng),
            finished: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    /// The noise model this simulator applies.
    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise
    }

    fn time_constant(&self, qubit: u32, model: DecayModel) -> Option<f64> {
        let noise = self.noise.qubit(qubit)?;
        match model {
            DecayModel::Relaxation => noise.t1,
            DecayModel::Dephasing => noise.t2,
        }
    }

    /// Sample the decay curve of one experiment.
    ///
    /// Relaxation measures the excited population `exp(-t/T1)` directly.
    /// The echo sequence for dephasing measures `(1 + exp(-t/T2)) / 2`, from
    /// which the coherence amplitude is recovered as `2p - 1`.
    fn sample_decay(&self, experiment: &ExperimentDescriptor, tau: f64) -> Vec<DecayPoint> {
        let shots = u64::from(experiment.shots());
        let n = shots as f64;
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        experiment
            .delays()
            .values()
            .iter()
            .map(|&delay| {
                let coherence = (-delay / tau).exp();
                let p = match experiment.model() {
                    DecayModel::Relaxation => coherence,
                    DecayModel::Dephasing => 0.5 * (1.0 + coherence),
                }
                .clamp(0.0, 1.0);

                let hits = draw_binomial(&mut *rng, shots, p);
                let frac = hits as f64 / n;
                // Smoothed estimate keeps the variance positive at 0 and `shots` hits.
                let smoothed = (hits as f64 + 0.5) / (n + 1.0);
                let var_frac = smoothed * (1.0 - smoothed) / n;

                match experiment.model() {
                    DecayModel::Relaxation => DecayPoint {
                        delay,
                        amplitude: frac,
                        variance: var_frac,
                    },
                    DecayModel::Dephasing => DecayPoint {
                        delay,
                        amplitude: 2.0 * frac - 1.0,
                        variance: 4.0 * var_frac,
                    },
                }
            })
            .collect()
    }

    /// Run one experiment to completion.
    #[instrument(skip(self, experiment), fields(qubit = experiment.qubit(), model = %experiment.model()))]
    fn run_simulation(&self, job_id: &JobId, experiment: &ExperimentDescriptor) -> CompletedRun {
        let start = Instant::now();
        let model = experiment.model();
        let mut run = CompletedRun::new(job_id.clone(), experiment.qubit(), model);

        debug!(
            points = experiment.delays().len(),
            shots = experiment.shots(),
            scheduling = %experiment.scheduling(),
            "Starting decay simulation"
        );

        match self.time_constant(experiment.qubit(), model) {
            None => debug!("No modelled time constant, completing without fit"),
            Some(tau) => {
                let points = self.sample_decay(experiment, tau);
                match fit_exponential_decay(&points) {
                    Some(fit) => {
                        let quality = match fit.reduced_chisq {
                            Some(chisq) if chisq <= GOOD_FIT_CHISQ => FitQuality::Good,
                            Some(_) => FitQuality::Bad,
                            None => FitQuality::Unknown,
                        };
                        let mut result =
                            AnalysisResult::new(model.result_name(), fit.tau, fit.std_dev)
                                .with_quality(quality);
                        if let Some(chisq) = fit.reduced_chisq {
                            result = result.with_chisq(chisq);
                        }
                        debug!(value = fit.tau, std_dev = fit.std_dev, "Fit converged");
                        run = run.with_result(result);
                    }
                    None => debug!("Fit did not converge"),
                }
            }
        }

        let elapsed = start.elapsed();
        run.with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

fn draw_binomial(rng: &mut impl Rng, n: u64, p: f64) -> u64 {
    match Binomial::new(n, p) {
        Ok(dist) => dist.sample(rng),
        // Unreachable for p in [0, 1]; fall back to the expectation.
        Err(_) => (n as f64 * p).round() as u64,
    }
}

#[async_trait]
impl ExecutionBackend for NoisySimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    #[instrument(skip(self, experiment))]
    async fn submit(&self, experiment: &ExperimentDescriptor) -> HalResult<JobId> {
        let shots = experiment.shots();
        if shots == 0 || shots > self.caps.max_shots {
            return Err(SimError::InvalidShots {
                shots,
                max: self.caps.max_shots,
            }
            .into());
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        debug!("Submitted job: {}", job_id);

        let run = self.run_simulation(&job_id, experiment);
        self.finished
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(job_id.0.clone(), run);

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let finished = self
            .finished
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if finished.contains_key(&job_id.0) {
            Ok(JobStatus::Completed)
        } else {
            Err(SimError::JobNotFound(job_id.0.clone()).into())
        }
    }

    async fn result(&self, job_id: &JobId) -> HalResult<CompletedRun> {
        self.finished
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&job_id.0)
            .ok_or_else(|| SimError::JobNotFound(job_id.0.clone()).into())
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let finished = self
            .finished
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !finished.contains_key(&job_id.0) {
            return Err(SimError::JobNotFound(job_id.0.clone()).into());
        }
        debug!("Job {} already finished, cancel ignored", job_id);
        Ok(())
    }
}

/// [`SimulatorFactory`] producing [`NoisySimulator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoisySimulatorFactory {
    seed: Option<u64>,
}

impl NoisySimulatorFactory {
    /// Factory whose simulators are seeded from entropy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose simulators are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl SimulatorFactory for NoisySimulatorFactory {
    fn create(
        &self,
        profile: &DeviceProfile,
        noise: NoiseModel,
    ) -> HalResult<Box<dyn ExecutionBackend>> {
        if noise.num_qubits() != profile.num_qubits() {
            return Err(SimError::ProfileMismatch {
                profile: profile.name.clone(),
                expected: profile.num_qubits(),
                model: noise.num_qubits(),
            }
            .into());
        }
        let sim = match self.seed {
            Some(seed) => NoisySimulator::with_seed(profile, noise, seed),
            None => NoisySimulator::new(profile, noise),
        };
        debug!(backend = sim.name(), "Created noisy simulator");
        Ok(Box::new(sim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::ThermalNoiseProvider;
    use qqms_hal::{DelayGrid, HalError, NoiseModelProvider, NoiseOptions, QubitProperties};

    fn profile() -> DeviceProfile {
        DeviceProfile {
            name: "fake_3q".into(),
            qubits: vec![
                QubitProperties {
                    t1: Some(80e-6),
                    t2: Some(60e-6),
                    frequency: None,
                },
                QubitProperties {
                    t1: None,
                    t2: None,
                    frequency: None,
                },
                QubitProperties {
                    t1: Some(120e-6),
                    t2: Some(150e-6),
                    frequency: None,
                },
            ],
            gate_error: None,
            readout_error: None,
        }
    }

    fn simulator(seed: u64) -> NoisySimulator {
        let profile = profile();
        let noise = ThermalNoiseProvider
            .derive(&profile, NoiseOptions::thermal_only())
            .unwrap();
        NoisySimulator::with_seed(&profile, noise, seed)
    }

    fn grid() -> DelayGrid {
        DelayGrid::from_values((0..60).map(|i| i as f64 * 5e-6).collect()).unwrap()
    }

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let sim = simulator(1);
        let caps = sim.capabilities();
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 3);
        assert_eq!(sim.name(), "noisy_fake_3q");
        assert!(caps.noise_profile.as_ref().unwrap().t1.is_some());
    }

    #[tokio::test]
    async fn test_relaxation_fit_near_model() {
        let sim = simulator(7);
        let desc = ExperimentDescriptor::new(0, DecayModel::Relaxation, grid());
        let run = sim.run(&desc).await.unwrap();

        let t1 = run.analysis_result("T1").unwrap();
        assert!((t1.value.nominal - 80e-6).abs() / 80e-6 < 0.15, "{t1:?}");
        assert!(t1.value.std_dev > 0.0);
        assert!(run.analysis_result("T2").is_none());
    }

    #[tokio::test]
    async fn test_dephasing_fit_near_model() {
        let sim = simulator(11);
        let desc = ExperimentDescriptor::new(0, DecayModel::Dephasing, grid());
        let run = sim.run(&desc).await.unwrap();

        let t2 = run.analysis_result("T2").unwrap();
        assert!((t2.value.nominal - 60e-6).abs() / 60e-6 < 0.25, "{t2:?}");
    }

    #[tokio::test]
    async fn test_missing_constant_yields_no_fit() {
        let sim = simulator(1);
        let desc = ExperimentDescriptor::new(1, DecayModel::Relaxation, grid());
        let run = sim.run(&desc).await.unwrap();
        assert!(run.analysis_results.is_empty());
    }

    #[tokio::test]
    async fn test_qubit_outside_device_yields_no_fit() {
        let sim = simulator(1);
        let desc = ExperimentDescriptor::new(9, DecayModel::Relaxation, grid());
        let run = sim.run(&desc).await.unwrap();
        assert_eq!(run.qubit, 9);
        assert!(run.analysis_result("T1").is_none());
    }

    #[tokio::test]
    async fn test_single_point_grid_yields_no_fit() {
        let sim = simulator(1);
        let grid = DelayGrid::from_values(vec![1e-5]).unwrap();
        let desc = ExperimentDescriptor::new(0, DecayModel::Relaxation, grid);
        let run = sim.run(&desc).await.unwrap();
        assert!(run.analysis_result("T1").is_none());
    }

    #[tokio::test]
    async fn test_same_seed_same_result() {
        let desc = ExperimentDescriptor::new(2, DecayModel::Relaxation, grid());
        let a = simulator(99).run(&desc).await.unwrap();
        let b = simulator(99).run(&desc).await.unwrap();
        assert_eq!(
            a.analysis_result("T1").unwrap().value,
            b.analysis_result("T1").unwrap().value
        );
    }

    #[tokio::test]
    async fn test_invalid_shots_rejected() {
        let sim = simulator(1);
        let desc = ExperimentDescriptor::new(0, DecayModel::Relaxation, grid()).with_shots(0);
        let err = sim.submit(&desc).await.unwrap_err();
        assert!(matches!(err, HalError::InvalidExperiment(_)));
    }

    #[tokio::test]
    async fn test_job_lifecycle() {
        let sim = simulator(1);
        let desc = ExperimentDescriptor::new(0, DecayModel::Relaxation, grid());
        let job_id = sim.submit(&desc).await.unwrap();
        assert_eq!(sim.status(&job_id).await.unwrap(), JobStatus::Completed);

        // Finished runs cannot be cancelled.
        sim.cancel(&job_id).await.unwrap();
        assert_eq!(sim.status(&job_id).await.unwrap(), JobStatus::Completed);
        assert!(sim.result(&job_id).await.is_ok());

        // The run is handed out once, then dropped.
        assert!(matches!(
            sim.result(&job_id).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(sim.finished.lock().unwrap().is_empty());

        let missing = JobId::new("nope");
        assert!(matches!(
            sim.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_factory_rejects_mismatched_noise() {
        let profile = profile();
        let mut noise = ThermalNoiseProvider
            .derive(&profile, NoiseOptions::thermal_only())
            .unwrap();
        noise.qubits.pop();
        assert!(NoisySimulatorFactory::with_seed(1)
            .create(&profile, noise)
            .is_err());
    }

    #[test]
    fn test_factory_builds_backend() {
        let profile = profile();
        let noise = ThermalNoiseProvider
            .derive(&profile, NoiseOptions::thermal_only())
            .unwrap();
        let backend = NoisySimulatorFactory::with_seed(1)
            .create(&profile, noise)
            .unwrap();
        assert_eq!(backend.capabilities().num_qubits, 3);
    }
}
