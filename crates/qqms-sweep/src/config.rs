//! Sweep configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Programmatic defaults
//!
//! API tokens are never read from configuration files; see
//! [`qqms_hal::Credentials::from_env`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use qqms_hal::{DEFAULT_SHOTS, DecayModel, SchedulingMethod};
use qqms_history::{JsonStore, MemoryStore, SqliteStore, TimeSeriesStore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SweepError, SweepResult};
use crate::orchestrator::FailurePolicy;

/// Default SQLite file name under the state directory.
pub const DEFAULT_SQLITE_FILE: &str = "history.db";

/// Default JSON-lines directory name under the state directory.
pub const DEFAULT_JSON_DIR: &str = "history";

/// Configuration for one calibration sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Number of qubits to sweep, starting at physical qubit 0.
    pub num_qubits: u32,

    /// Run against a remote device instead of the local simulator.
    pub live_backend: bool,

    /// Remote backend id; required for live runs.
    pub backend_id: Option<String>,

    /// Service instance (hub/group/project) for live runs.
    pub instance: Option<String>,

    /// First delay, in `delay_unit`s.
    pub delay_start: f64,

    /// Last delay, in `delay_unit`s.
    pub delay_end: f64,

    /// Number of delay points per qubit.
    pub delay_spread: u32,

    /// Seconds per configured delay unit.
    pub delay_unit: f64,

    /// Decay model to measure.
    pub model: DecayModel,

    /// Destination table; defaults to `T1History` or `T2History`.
    pub table_id: Option<String>,

    /// Instruction scheduling.
    pub scheduling: SchedulingMethod,

    /// Shots per delay point.
    pub shots: u32,

    /// Simulator seed for reproducible local runs.
    pub seed: Option<u64>,

    /// Interval between job status polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// History store.
    pub store: StoreSpec,

    /// Write fitted outcomes to the history store.
    pub persist: bool,

    /// Per-qubit execution failure handling.
    pub failure_policy: FailurePolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            num_qubits: 5,
            live_backend: false,
            backend_id: None,
            instance: None,
            delay_start: 0.0,
            delay_end: 50.0,
            delay_spread: 100,
            delay_unit: 1e-5,
            model: DecayModel::Relaxation,
            table_id: None,
            scheduling: SchedulingMethod::Asap,
            shots: DEFAULT_SHOTS,
            seed: None,
            poll_interval_ms: 500,
            store: StoreSpec::Memory,
            persist: true,
            failure_policy: FailurePolicy::Isolate,
        }
    }
}

impl SweepConfig {
    /// Load configuration from a YAML file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SweepResult<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML file without validating, for callers that apply
    /// overrides first.
    pub fn load<P: AsRef<Path>>(path: P) -> SweepResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SweepError::ConfigFile(format!("{}: {e}", path.display())))?;

        serde_yaml_ng::from_str(&contents)
            .map_err(|e| SweepError::ConfigFile(format!("{}: {e}", path.display())))
    }

    /// Check the configuration before any backend interaction.
    pub fn validate(&self) -> SweepResult<()> {
        let invalid = |msg: String| Err(SweepError::InvalidSweepConfig(msg));

        if self.num_qubits == 0 {
            return invalid("num_qubits must be at least 1".into());
        }
        if self.delay_spread == 0 {
            return invalid("delay_spread must be at least 1".into());
        }
        if !self.delay_start.is_finite() || !self.delay_end.is_finite() {
            return invalid(format!(
                "delay bounds must be finite (start={}, end={})",
                self.delay_start, self.delay_end
            ));
        }
        if self.delay_start < 0.0 {
            return invalid(format!("delay_start {} is negative", self.delay_start));
        }
        if self.delay_end < self.delay_start {
            return invalid(format!(
                "delay_end {} is before delay_start {}",
                self.delay_end, self.delay_start
            ));
        }
        if !self.delay_unit.is_finite() || self.delay_unit <= 0.0 {
            return invalid(format!("delay_unit {} must be positive", self.delay_unit));
        }
        if self.shots == 0 {
            return invalid("shots must be at least 1".into());
        }
        if self.poll_interval_ms == 0 {
            return invalid("poll_interval_ms must be at least 1".into());
        }
        match (self.live_backend, self.backend_id.as_deref()) {
            (true, None) | (true, Some("")) => {
                return invalid("backend_id is required when live_backend is set".into());
            }
            (false, Some(id)) => {
                return invalid(format!(
                    "backend_id '{id}' given without live_backend; local runs use the simulator"
                ));
            }
            _ => {}
        }
        if let Some(table) = &self.table_id {
            if table.is_empty() {
                return invalid("table_id must not be empty".into());
            }
        }

        Ok(())
    }

    /// Destination table for persisted records.
    pub fn table_id(&self) -> String {
        self.table_id
            .clone()
            .unwrap_or_else(|| format!("{}History", self.model.result_name()))
    }

    /// Status poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Delay bounds in seconds.
    pub fn delay_bounds_seconds(&self) -> (f64, f64) {
        (
            self.delay_start * self.delay_unit,
            self.delay_end * self.delay_unit,
        )
    }
}

/// Where history records are written.
///
/// Parsed from `memory`, `json[:<dir>]`, `sqlite[:<path>]` or
/// `dynamodb:<region>`. Paths default to the state directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StoreSpec {
    /// In-process store, discarded on exit.
    #[default]
    Memory,
    /// One JSON-lines file per table under a directory.
    Json(Option<PathBuf>),
    /// SQLite database file.
    Sqlite(Option<PathBuf>),
    /// DynamoDB in an AWS region.
    DynamoDb(String),
}

impl FromStr for StoreSpec {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg).filter(|a| !a.is_empty())),
            None => (s, None),
        };

        match (kind.to_ascii_lowercase().as_str(), arg) {
            ("memory", None) => Ok(StoreSpec::Memory),
            ("json", path) => Ok(StoreSpec::Json(path.map(PathBuf::from))),
            ("sqlite", path) => Ok(StoreSpec::Sqlite(path.map(PathBuf::from))),
            ("dynamodb", Some(region)) => Ok(StoreSpec::DynamoDb(region.to_string())),
            ("dynamodb", None) => Err(SweepError::InvalidSweepConfig(
                "dynamodb store needs a region (dynamodb:<region>)".into(),
            )),
            _ => Err(SweepError::InvalidSweepConfig(format!(
                "unknown store '{s}' (expected memory, json[:dir], sqlite[:path] or dynamodb:region)"
            ))),
        }
    }
}

impl fmt::Display for StoreSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreSpec::Memory => f.write_str("memory"),
            StoreSpec::Json(None) => f.write_str("json"),
            StoreSpec::Json(Some(dir)) => write!(f, "json:{}", dir.display()),
            StoreSpec::Sqlite(None) => f.write_str("sqlite"),
            StoreSpec::Sqlite(Some(path)) => write!(f, "sqlite:{}", path.display()),
            StoreSpec::DynamoDb(region) => write!(f, "dynamodb:{region}"),
        }
    }
}

impl TryFrom<String> for StoreSpec {
    type Error = SweepError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StoreSpec> for String {
    fn from(spec: StoreSpec) -> Self {
        spec.to_string()
    }
}

/// Directory for default store files (`~/.qqms`).
pub fn state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".qqms"))
        .unwrap_or_else(|| PathBuf::from(".qqms"))
}

/// Open the store described by `spec`.
pub async fn open_store(spec: &StoreSpec) -> SweepResult<Arc<dyn TimeSeriesStore>> {
    let store: Arc<dyn TimeSeriesStore> = match spec {
        StoreSpec::Memory => Arc::new(MemoryStore::new()),
        StoreSpec::Json(dir) => {
            let dir = dir
                .clone()
                .unwrap_or_else(|| state_dir().join(DEFAULT_JSON_DIR));
            Arc::new(JsonStore::new(dir).await?)
        }
        StoreSpec::Sqlite(path) => {
            let path = path
                .clone()
                .unwrap_or_else(|| state_dir().join(DEFAULT_SQLITE_FILE));
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(qqms_history::HistoryError::from)?;
            }
            Arc::new(SqliteStore::new(path)?)
        }
        #[cfg(feature = "dynamodb")]
        StoreSpec::DynamoDb(region) => {
            Arc::new(qqms_history::DynamoStore::connect(region.clone()).await)
        }
        #[cfg(not(feature = "dynamodb"))]
        StoreSpec::DynamoDb(_) => {
            return Err(SweepError::InvalidSweepConfig(
                "dynamodb store requires the `dynamodb` feature".into(),
            ));
        }
    };

    info!(store = %spec, "opened history store");
    Ok(store)
}
