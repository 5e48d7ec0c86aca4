//! Sweep outcomes and result series.
//!
//! [`ResultSeries`] is what a sweep hands to callers and to the external
//! chart frontend. It holds exactly one [`MeasurementOutcome`] per qubit,
//! indexed by physical qubit, whether or not a fit was available.

use qqms_hal::{DecayModel, UncertainValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fitted value for one qubit, or absent when no usable fit exists.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasurementOutcome(Option<UncertainValue>);

impl MeasurementOutcome {
    /// A fitted value with its standard deviation, in seconds.
    pub fn fitted(value: f64, std_dev: f64) -> Self {
        Self(Some(UncertainValue::new(value, std_dev)))
    }

    /// No fit for this qubit.
    pub fn absent() -> Self {
        Self(None)
    }

    /// Nominal value, if fitted.
    pub fn value(&self) -> Option<f64> {
        self.0.map(|v| v.nominal)
    }

    /// Standard deviation, if fitted.
    pub fn std_dev(&self) -> Option<f64> {
        self.0.map(|v| v.std_dev)
    }

    /// Value and standard deviation together.
    pub fn as_uncertain(&self) -> Option<UncertainValue> {
        self.0
    }

    /// Whether the qubit had no usable fit.
    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

impl From<UncertainValue> for MeasurementOutcome {
    fn from(value: UncertainValue) -> Self {
        Self(Some(value))
    }
}

/// Ordered outcomes of one sweep, index-aligned with physical qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSeries {
    model: DecayModel,
    outcomes: Vec<MeasurementOutcome>,
}

impl ResultSeries {
    /// Series for `model` from outcomes already in qubit order.
    pub fn new(model: DecayModel, outcomes: Vec<MeasurementOutcome>) -> Self {
        Self { model, outcomes }
    }

    /// Model kind the series measured.
    pub fn model(&self) -> DecayModel {
        self.model
    }

    /// Number of qubits, fitted or not.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the series covers no qubits.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome for physical qubit `qubit`.
    pub fn get(&self, qubit: u32) -> Option<&MeasurementOutcome> {
        self.outcomes.get(qubit as usize)
    }

    /// `(qubit, outcome)` pairs in qubit order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &MeasurementOutcome)> {
        (0u32..).zip(self.outcomes.iter())
    }

    /// Only the qubits with a fit, in qubit order.
    pub fn fitted(&self) -> impl Iterator<Item = (u32, UncertainValue)> + '_ {
        self.iter()
            .filter_map(|(q, outcome)| outcome.as_uncertain().map(|v| (q, v)))
    }

    /// Number of absent outcomes.
    pub fn absent_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_absent()).count()
    }

    /// All outcomes as a slice.
    pub fn outcomes(&self) -> &[MeasurementOutcome] {
        &self.outcomes
    }
}

#[derive(Serialize, Deserialize)]
struct OutcomeDoc {
    qubit: u32,
    value: Option<f64>,
    std_dev: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct SeriesDoc {
    model: String,
    outcomes: Vec<OutcomeDoc>,
}

impl Serialize for ResultSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let doc = SeriesDoc {
            model: self.model.result_name().to_string(),
            outcomes: self
                .iter()
                .map(|(qubit, o)| OutcomeDoc {
                    qubit,
                    value: o.value(),
                    std_dev: o.std_dev(),
                })
                .collect(),
        };
        doc.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResultSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let doc = SeriesDoc::deserialize(deserializer)?;
        let model: DecayModel = doc.model.parse().map_err(D::Error::custom)?;

        let mut outcomes = Vec::with_capacity(doc.outcomes.len());
        for (index, entry) in doc.outcomes.into_iter().enumerate() {
            if entry.qubit as usize != index {
                return Err(D::Error::custom(format!(
                    "outcome {index} is for qubit {}; series must be index-aligned",
                    entry.qubit
                )));
            }
            // A null std_dev next to a value is an undefined deviation, not a missing fit.
            outcomes.push(match entry.value {
                Some(v) => MeasurementOutcome::fitted(v, entry.std_dev.unwrap_or(f64::NAN)),
                None => MeasurementOutcome::absent(),
            });
        }
        Ok(Self { model, outcomes })
    }
}

/// A qubit whose experiment could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitFailure {
    /// Physical qubit index.
    pub qubit: u32,
    /// Error message.
    pub message: String,
}

/// Result series plus per-qubit execution failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// One outcome per qubit.
    pub series: ResultSeries,
    /// Qubits whose execution failed; their outcomes are absent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<QubitFailure>,
}

impl SweepReport {
    /// Whether every qubit executed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
