//! End-to-end calibration: resolve, sweep, persist.

use std::sync::Arc;

use qqms_hal::{Credentials, DeviceProfile};
use qqms_history::{HistoryWriter, TimeSeriesStore};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::SweepConfig;
use crate::error::SweepResult;
use crate::grid::DelayGridBuilder;
use crate::orchestrator::{SweepObserver, SweepOrchestrator};
use crate::outcome::{QubitFailure, SweepReport};
use crate::resolver::BackendResolver;

/// What a calibration run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationSummary {
    /// Per-qubit outcomes and execution failures.
    pub report: SweepReport,
    /// Table records were written to.
    pub table_id: String,
    /// Number of records written.
    pub persisted: usize,
    /// Fitted qubits whose record could not be written.
    pub persistence_errors: Vec<QubitFailure>,
}

/// Runs a full calibration sweep from a [`SweepConfig`].
pub struct CalibrationPipeline {
    resolver: BackendResolver,
    profile: DeviceProfile,
    store: Arc<dyn TimeSeriesStore>,
    credentials: Option<Credentials>,
    observer: Option<Arc<dyn SweepObserver>>,
    writer: HistoryWriter,
}

impl CalibrationPipeline {
    /// Pipeline simulating `profile` locally, or resolving remotely when the
    /// config asks for a live backend.
    pub fn new(
        resolver: BackendResolver,
        profile: DeviceProfile,
        store: Arc<dyn TimeSeriesStore>,
    ) -> Self {
        Self {
            resolver,
            profile,
            store,
            credentials: None,
            observer: None,
            writer: HistoryWriter::new(),
        }
    }

    /// Credentials for live runs.
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Progress observer passed to the orchestrator.
    pub fn with_observer(mut self, observer: Arc<dyn SweepObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Reference profile used for local runs.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Validate, build grids, resolve the backend, sweep and persist.
    ///
    /// Configuration and resolution errors are returned before anything is
    /// submitted. A record that fails to persist is reported in the summary
    /// and does not stop the remaining writes.
    #[instrument(skip_all, fields(model = %config.model, qubits = config.num_qubits, live = config.live_backend))]
    pub async fn run(&self, config: &SweepConfig) -> SweepResult<CalibrationSummary> {
        config.validate()?;

        let (start, end) = config.delay_bounds_seconds();
        let grids = DelayGridBuilder::build(
            config.num_qubits,
            start,
            end,
            config.delay_spread as usize,
        )?;

        let backend = self
            .resolver
            .resolve(
                config.live_backend,
                &self.profile,
                config.backend_id.as_deref(),
                self.credentials.as_ref(),
            )
            .await?;

        let mut orchestrator = SweepOrchestrator::new()
            .with_policy(config.failure_policy)
            .with_scheduling(config.scheduling)
            .with_shots(config.shots);
        if let Some(observer) = &self.observer {
            orchestrator = orchestrator.with_observer(Arc::clone(observer));
        }

        let report = orchestrator
            .run_sweep(config.num_qubits, config.model, &grids, backend.as_ref())
            .await?;

        let table_id = config.table_id();
        let mut persisted = 0;
        let mut persistence_errors = Vec::new();

        if config.persist {
            for (qubit, value) in report.series.fitted() {
                match self
                    .writer
                    .record(
                        &table_id,
                        qubit,
                        value.nominal,
                        value.std_dev,
                        config.model,
                        self.store.as_ref(),
                    )
                    .await
                {
                    Ok(_) => persisted += 1,
                    Err(e) => {
                        warn!(qubit, table = %table_id, error = %e, "failed to persist record");
                        persistence_errors.push(QubitFailure {
                            qubit,
                            message: e.to_string(),
                        });
                    }
                }
            }
            info!(
                table = %table_id,
                store = self.store.name(),
                persisted,
                failed = persistence_errors.len(),
                "history updated"
            );
        }

        Ok(CalibrationSummary {
            report,
            table_id,
            persisted,
            persistence_errors,
        })
    }
}

impl std::fmt::Debug for CalibrationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationPipeline")
            .field("resolver", &self.resolver)
            .field("profile", &self.profile.name)
            .field("store", &self.store.name())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
