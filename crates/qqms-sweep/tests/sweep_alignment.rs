//! Result series shape and qubit alignment against a stub backend.

mod common;

use common::{StubBackend, StubOutcome};
use proptest::prelude::*;
use qqms_hal::DecayModel;
use qqms_sweep::{DelayGridBuilder, FailurePolicy, SweepError, SweepOrchestrator};

fn grids(n: u32) -> Vec<qqms_hal::DelayGrid> {
    DelayGridBuilder::build(n, 0.0, 50e-5, 10).unwrap()
}

#[tokio::test]
async fn test_series_index_matches_physical_qubit() {
    let backend = StubBackend::new(8);
    let report = SweepOrchestrator::new()
        .run_sweep(8, DecayModel::Relaxation, &grids(8), &backend)
        .await
        .unwrap();

    assert_eq!(report.series.len(), 8);
    for (qubit, outcome) in report.series.iter() {
        let (v, s) = StubBackend::default_fit(qubit);
        assert_eq!(outcome.value(), Some(v), "qubit {qubit}");
        assert_eq!(outcome.std_dev(), Some(s), "qubit {qubit}");
    }
    assert_eq!(backend.submitted_qubits(), (0..8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_no_fit_on_qubit_three_of_five() {
    let backend = StubBackend::new(5).with(3, StubOutcome::NoFit);
    let report = SweepOrchestrator::new()
        .run_sweep(5, DecayModel::Relaxation, &grids(5), &backend)
        .await
        .unwrap();

    assert_eq!(report.series.len(), 5);
    assert!(report.series.get(3).unwrap().is_absent());
    for qubit in [0, 1, 2, 4] {
        let outcome = report.series.get(qubit).unwrap();
        assert_eq!(outcome.value(), Some(StubBackend::default_fit(qubit).0));
    }
    assert!(report.is_clean(), "a missing fit is not a failure");
}

#[tokio::test]
async fn test_dephasing_reads_t2_result() {
    let backend = StubBackend::new(2).with(1, StubOutcome::Fit(42e-6, 3e-6));
    let report = SweepOrchestrator::new()
        .run_sweep(2, DecayModel::Dephasing, &grids(2), &backend)
        .await
        .unwrap();

    assert_eq!(report.series.model(), DecayModel::Dephasing);
    assert_eq!(report.series.get(1).unwrap().value(), Some(42e-6));
    let submitted = backend.submitted.lock().unwrap();
    assert!(submitted.iter().all(|d| d.model() == DecayModel::Dephasing));
}

#[tokio::test]
async fn test_isolated_failure_keeps_later_qubits() {
    let backend = StubBackend::new(4).with(1, StubOutcome::Fail);
    let report = SweepOrchestrator::new()
        .run_sweep(4, DecayModel::Relaxation, &grids(4), &backend)
        .await
        .unwrap();

    assert_eq!(report.series.len(), 4);
    assert!(report.series.get(1).unwrap().is_absent());
    assert!(!report.series.get(3).unwrap().is_absent());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].qubit, 1);
    assert_eq!(backend.submitted_qubits(), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_abort_policy_propagates_failure() {
    let backend = StubBackend::new(4).with(2, StubOutcome::Fail);
    let err = SweepOrchestrator::new()
        .with_policy(FailurePolicy::Abort)
        .run_sweep(4, DecayModel::Relaxation, &grids(4), &backend)
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::ExecutionFailure { qubit: 2, .. }));
    assert_eq!(backend.submitted_qubits(), vec![0, 1, 2]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_series_length_equals_qubit_count(
        num_qubits in 1u32..24,
        missing in proptest::collection::vec(any::<bool>(), 24),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let mut backend = StubBackend::new(num_qubits);
        for qubit in 0..num_qubits {
            if missing[qubit as usize] {
                backend = backend.with(qubit, StubOutcome::NoFit);
            }
        }

        let report = runtime
            .block_on(SweepOrchestrator::new().run_sweep(
                num_qubits,
                DecayModel::Relaxation,
                &grids(num_qubits),
                &backend,
            ))
            .unwrap();

        prop_assert_eq!(report.series.len(), num_qubits as usize);
        for (qubit, outcome) in report.series.iter() {
            prop_assert_eq!(outcome.is_absent(), missing[qubit as usize]);
        }
    }
}
