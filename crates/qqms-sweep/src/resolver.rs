//! Backend selection: local noisy simulator or remote device.

use std::sync::Arc;

use qqms_hal::{
    Credentials, DeviceProfile, ExecutionBackend, ExecutionService, NoiseModelProvider,
    NoiseOptions, SimulatorFactory,
};
use tracing::{info, instrument};

use crate::error::{SweepError, SweepResult};

/// Resolves the backend a sweep runs against.
///
/// Local resolution derives a thermal-relaxation-only noise model from the
/// reference profile and builds a simulator with it; it never touches the
/// execution service. Live resolution authenticates and looks up the named
/// device, and any failure there is returned as-is with no local fallback.
#[derive(Clone)]
pub struct BackendResolver {
    noise: Arc<dyn NoiseModelProvider>,
    simulators: Arc<dyn SimulatorFactory>,
    service: Arc<dyn ExecutionService>,
}

impl BackendResolver {
    /// Create a resolver from its collaborators.
    pub fn new(
        noise: Arc<dyn NoiseModelProvider>,
        simulators: Arc<dyn SimulatorFactory>,
        service: Arc<dyn ExecutionService>,
    ) -> Self {
        Self {
            noise,
            simulators,
            service,
        }
    }

    /// Resolve a backend.
    ///
    /// `backend_id` and `credentials` are required when `live` is set and
    /// ignored otherwise.
    #[instrument(skip(self, profile, credentials), fields(profile = %profile.name))]
    pub async fn resolve(
        &self,
        live: bool,
        profile: &DeviceProfile,
        backend_id: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> SweepResult<Box<dyn ExecutionBackend>> {
        if live {
            self.resolve_remote(backend_id, credentials).await
        } else {
            self.resolve_local(profile)
        }
    }

    fn resolve_local(&self, profile: &DeviceProfile) -> SweepResult<Box<dyn ExecutionBackend>> {
        let noise = self
            .noise
            .derive(profile, NoiseOptions::thermal_only())
            .map_err(|e| SweepError::BackendUnavailable(format!("noise model: {e}")))?;
        let backend = self
            .simulators
            .create(profile, noise)
            .map_err(|e| SweepError::BackendUnavailable(format!("simulator: {e}")))?;

        info!(
            backend = backend.name(),
            qubits = backend.capabilities().num_qubits,
            "resolved local simulator"
        );
        Ok(backend)
    }

    async fn resolve_remote(
        &self,
        backend_id: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> SweepResult<Box<dyn ExecutionBackend>> {
        let backend_id = backend_id.ok_or_else(|| {
            SweepError::InvalidSweepConfig("a backend id is required for live runs".into())
        })?;
        let credentials = credentials.ok_or_else(|| {
            SweepError::InvalidSweepConfig("credentials are required for live runs".into())
        })?;

        let session = self
            .service
            .authenticate(credentials)
            .await
            .map_err(|e| SweepError::BackendUnavailable(format!("{}: {e}", self.service.name())))?;
        let backend = session
            .backend(backend_id)
            .await
            .map_err(|e| SweepError::BackendUnavailable(format!("{backend_id}: {e}")))?;

        info!(
            backend = backend.name(),
            qubits = backend.capabilities().num_qubits,
            "resolved remote backend"
        );
        Ok(backend)
    }
}

impl std::fmt::Debug for BackendResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendResolver")
            .field("service", &self.service.name())
            .finish_non_exhaustive()
    }
}
