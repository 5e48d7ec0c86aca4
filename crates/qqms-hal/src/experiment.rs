//! Experiment descriptors for delay-sweep calibration.
//!
//! An [`ExperimentDescriptor`] binds one physical qubit to a decay model
//! and the [`DelayGrid`] that samples its decay curve. Descriptors are
//! immutable once built: a backend receives them by reference and never
//! mutates them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Default number of shots per delay point.
pub const DEFAULT_SHOTS: u32 = 1024;

/// Which decay constant a sweep measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayModel {
    /// Energy relaxation (T1): excited-state population decay.
    #[serde(alias = "t1", alias = "T1")]
    Relaxation,
    /// Dephasing (T2): coherence decay under a Hahn-echo refocusing sequence.
    #[serde(alias = "t2", alias = "T2", alias = "t2_hahn")]
    Dephasing,
}

impl DecayModel {
    /// Both model kinds, in canonical order.
    pub const ALL: [DecayModel; 2] = [DecayModel::Relaxation, DecayModel::Dephasing];

    /// Name of the analysis result a fitted run carries for this model.
    pub fn result_name(&self) -> &'static str {
        match self {
            DecayModel::Relaxation => "T1",
            DecayModel::Dephasing => "T2",
        }
    }

    /// Name of the calibration sequence submitted for this model.
    pub fn sequence_name(&self) -> &'static str {
        match self {
            DecayModel::Relaxation => "t1",
            DecayModel::Dephasing => "t2_hahn",
        }
    }
}

impl fmt::Display for DecayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.result_name())
    }
}

impl FromStr for DecayModel {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "t1" | "relaxation" => Ok(DecayModel::Relaxation),
            "t2" | "t2_hahn" | "dephasing" => Ok(DecayModel::Dephasing),
            other => Err(HalError::InvalidExperiment(format!(
                "unknown decay model '{other}' (expected t1 or t2)"
            ))),
        }
    }
}

/// Instruction scheduling policy applied when the backend lowers the
/// calibration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMethod {
    /// As soon as possible.
    #[default]
    Asap,
    /// As late as possible.
    Alap,
}

impl fmt::Display for SchedulingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingMethod::Asap => write!(f, "asap"),
            SchedulingMethod::Alap => write!(f, "alap"),
        }
    }
}

/// Ordered delay values (seconds) sampled by one qubit's sweep.
///
/// Values are finite, non-negative and non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct DelayGrid(Vec<f64>);

impl DelayGrid {
    /// Build a grid from raw delay values, checking the ordering invariant.
    pub fn from_values(values: Vec<f64>) -> HalResult<Self> {
        if values.is_empty() {
            return Err(HalError::InvalidExperiment("delay grid is empty".into()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(HalError::InvalidExperiment(format!(
                "delay {bad} is not a finite non-negative value"
            )));
        }
        if values.windows(2).any(|w| w[1] < w[0]) {
            return Err(HalError::InvalidExperiment(
                "delay grid must be non-decreasing".into(),
            ));
        }
        Ok(Self(values))
    }

    /// Delay values in seconds.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of delay points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the grid has no points. Never true for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Smallest delay.
    pub fn start(&self) -> f64 {
        self.0.first().copied().unwrap_or_default()
    }

    /// Largest delay.
    pub fn end(&self) -> f64 {
        self.0.last().copied().unwrap_or_default()
    }
}

impl TryFrom<Vec<f64>> for DelayGrid {
    type Error = HalError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_values(values)
    }
}

impl From<DelayGrid> for Vec<f64> {
    fn from(grid: DelayGrid) -> Self {
        grid.0
    }
}

/// A single-qubit decay-sweep experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDescriptor {
    qubit: u32,
    model: DecayModel,
    delays: DelayGrid,
    scheduling: SchedulingMethod,
    shots: u32,
}

impl ExperimentDescriptor {
    /// Describe a sweep of `model` on physical qubit `qubit`.
    ///
    /// Scheduling defaults to [`SchedulingMethod::Asap`].
    pub fn new(qubit: u32, model: DecayModel, delays: DelayGrid) -> Self {
        Self {
            qubit,
            model,
            delays,
            scheduling: SchedulingMethod::Asap,
            shots: DEFAULT_SHOTS,
        }
    }

    /// Override the scheduling policy.
    pub fn with_scheduling(mut self, scheduling: SchedulingMethod) -> Self {
        self.scheduling = scheduling;
        self
    }

    /// Override the shots per delay point.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Physical qubit index.
    pub fn qubit(&self) -> u32 {
        self.qubit
    }

    /// Decay model being measured.
    pub fn model(&self) -> DecayModel {
        self.model
    }

    /// Delay grid.
    pub fn delays(&self) -> &DelayGrid {
        &self.delays
    }

    /// Scheduling policy.
    pub fn scheduling(&self) -> SchedulingMethod {
        self.scheduling
    }

    /// Shots per delay point.
    pub fn shots(&self) -> u32 {
        self.shots
    }
}
