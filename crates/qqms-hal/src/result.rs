//! Completed-run results.
//!
//! A backend hands back a [`CompletedRun`] carrying zero or more named
//! [`AnalysisResult`]s. A run without the result named after its decay
//! model means the fit did not converge; that is a normal outcome, not an
//! error.

use serde::{Deserialize, Serialize};

use crate::experiment::DecayModel;
use crate::job::JobId;

/// A value with its one-sigma uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertainValue {
    /// Nominal (best-fit) value.
    pub nominal: f64,
    /// Standard deviation.
    pub std_dev: f64,
}

impl UncertainValue {
    /// Create a value with uncertainty.
    pub fn new(nominal: f64, std_dev: f64) -> Self {
        Self { nominal, std_dev }
    }
}

/// Fit quality reported by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    /// Fit passed the backend's quality checks.
    Good,
    /// Fit converged but failed a quality check.
    Bad,
    /// No quality assessment available.
    #[default]
    Unknown,
}

/// A named result produced by a run's analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Result name (e.g. `"T1"`).
    pub name: String,
    /// Fitted value.
    pub value: UncertainValue,
    /// Unit of `value`.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Reduced chi-squared of the fit, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chisq: Option<f64>,
    /// Quality flag.
    #[serde(default)]
    pub quality: FitQuality,
}

fn default_unit() -> String {
    "s".to_string()
}

impl AnalysisResult {
    /// Create a result in seconds.
    pub fn new(name: impl Into<String>, nominal: f64, std_dev: f64) -> Self {
        Self {
            name: name.into(),
            value: UncertainValue::new(nominal, std_dev),
            unit: default_unit(),
            chisq: None,
            quality: FitQuality::Unknown,
        }
    }

    /// Attach a reduced chi-squared.
    pub fn with_chisq(mut self, chisq: f64) -> Self {
        self.chisq = Some(chisq);
        self
    }

    /// Attach a quality flag.
    pub fn with_quality(mut self, quality: FitQuality) -> Self {
        self.quality = quality;
        self
    }
}

/// The output of a finished calibration job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRun {
    /// Job that produced this run.
    pub job_id: JobId,
    /// Physical qubit the run measured.
    pub qubit: u32,
    /// Decay model the run measured.
    pub model: DecayModel,
    /// Named analysis results.
    #[serde(default)]
    pub analysis_results: Vec<AnalysisResult>,
    /// Wall-clock execution time in milliseconds, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl CompletedRun {
    /// Create a run with no analysis results.
    pub fn new(job_id: impl Into<JobId>, qubit: u32, model: DecayModel) -> Self {
        Self {
            job_id: job_id.into(),
            qubit,
            model,
            analysis_results: Vec::new(),
            execution_time_ms: None,
        }
    }

    /// Add an analysis result.
    pub fn with_result(mut self, result: AnalysisResult) -> Self {
        self.analysis_results.push(result);
        self
    }

    /// Set the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Look up an analysis result by name.
    ///
    /// If a name appears more than once the last entry wins, matching how
    /// re-analysis appends to a run.
    pub fn analysis_result(&self, name: &str) -> Option<&AnalysisResult> {
        self.analysis_results.iter().rev().find(|r| r.name == name)
    }
}
