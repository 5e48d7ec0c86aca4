//! Extraction of fitted decay constants from completed runs.

use qqms_hal::{CompletedRun, DecayModel};
use tracing::debug;

use crate::outcome::MeasurementOutcome;

/// Reads the fitted constant for a model kind out of a completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultExtractor;

impl ResultExtractor {
    /// Look up the analysis result named after `model` (`"T1"` or `"T2"`).
    ///
    /// A missing result is not an error: the qubit's decay curve could not
    /// be fitted and the outcome is absent. So is a non-finite nominal value.
    /// A finite value with an undefined standard deviation is kept as is.
    pub fn extract(run: &CompletedRun, model: DecayModel) -> MeasurementOutcome {
        let name = model.result_name();
        match run.analysis_result(name) {
            Some(result) if result.value.nominal.is_finite() => {
                if !result.value.std_dev.is_finite() {
                    debug!(qubit = run.qubit, result = name, "fit has no finite standard deviation");
                }
                MeasurementOutcome::from(result.value)
            }
            Some(_) => {
                debug!(qubit = run.qubit, result = name, "non-finite fit, treating as absent");
                MeasurementOutcome::absent()
            }
            None => {
                debug!(qubit = run.qubit, result = name, "no fit available");
                MeasurementOutcome::absent()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qqms_hal::AnalysisResult;

    fn run(model: DecayModel) -> CompletedRun {
        CompletedRun::new("job", 0, model)
    }

    #[test]
    fn test_extracts_named_result() {
        let run = run(DecayModel::Relaxation)
            .with_result(AnalysisResult::new("T1_amplitude", 0.97, 0.01))
            .with_result(AnalysisResult::new("T1", 12.3e-6, 0.4e-6));
        let outcome = ResultExtractor::extract(&run, DecayModel::Relaxation);
        assert_eq!(outcome, MeasurementOutcome::fitted(12.3e-6, 0.4e-6));
    }

    #[test]
    fn test_missing_result_is_absent() {
        let dephasing =
            run(DecayModel::Dephasing).with_result(AnalysisResult::new("T1", 1e-5, 1e-7));
        assert!(ResultExtractor::extract(&dephasing, DecayModel::Dephasing).is_absent());
        assert!(ResultExtractor::extract(&run(DecayModel::Relaxation), DecayModel::Relaxation).is_absent());
    }

    #[test]
    fn test_non_finite_is_absent() {
        let run = run(DecayModel::Relaxation).with_result(AnalysisResult::new("T1", f64::NAN, 1e-7));
        assert!(ResultExtractor::extract(&run, DecayModel::Relaxation).is_absent());
    }

    #[test]
    fn test_undefined_std_dev_keeps_value() {
        let run = run(DecayModel::Relaxation).with_result(AnalysisResult::new("T1", 12.3e-6, f64::NAN));
        let outcome = ResultExtractor::extract(&run, DecayModel::Relaxation);
        assert!(!outcome.is_absent());
        assert_eq!(outcome.value(), Some(12.3e-6));
        assert!(outcome.std_dev().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_last_result_wins() {
        let run = run(DecayModel::Dephasing)
            .with_result(AnalysisResult::new("T2", 1e-5, 1e-6))
            .with_result(AnalysisResult::new("T2", 2e-5, 2e-6));
        let outcome = ResultExtractor::extract(&run, DecayModel::Dephasing);
        assert_eq!(outcome.value(), Some(2e-5));
    }
}
