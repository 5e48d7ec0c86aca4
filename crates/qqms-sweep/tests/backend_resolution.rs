//! Backend resolution against stub collaborators.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{CountingService, StubBackend, StubFactory, StubNoise, profile, resolver};
use qqms_hal::Credentials;
use qqms_sweep::SweepError;

#[tokio::test]
async fn test_local_resolution_never_calls_service() {
    let noise = Arc::new(StubNoise::default());
    let service = Arc::new(CountingService::default());
    let resolver = resolver(noise.clone(), StubFactory::new(StubBackend::new(5)), service.clone());

    let backend = resolver
        .resolve(false, &profile(5), None, None)
        .await
        .unwrap();

    assert_eq!(backend.name(), "stub");
    assert_eq!(noise.calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_local_resolution_ignores_credentials() {
    let service = Arc::new(CountingService::default());
    let resolver = resolver(Arc::default(), StubFactory::new(StubBackend::new(2)), service.clone());

    resolver
        .resolve(false, &profile(2), Some("device_a"), Some(&Credentials::new("valid")))
        .await
        .unwrap();
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_nonexistent_backend_is_unavailable() {
    let noise = Arc::new(StubNoise::default());
    let service = Arc::new(CountingService::default());
    let resolver = resolver(noise.clone(), StubFactory::new(StubBackend::new(5)), service.clone());

    let err = resolver
        .resolve(true, &profile(5), Some("nonexistent"), Some(&Credentials::new("valid")))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, SweepError::BackendUnavailable(_)), "{err}");
    assert!(err.to_string().contains("nonexistent"));
    // No fallback to the simulator.
    assert_eq!(noise.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_token_is_unavailable() {
    let service = Arc::new(CountingService::default());
    let resolver = resolver(Arc::default(), StubFactory::new(StubBackend::new(5)), service.clone());

    let err = resolver
        .resolve(true, &profile(5), Some("device_a"), Some(&Credentials::new("expired")))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, SweepError::BackendUnavailable(_)));
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_live_resolution_returns_remote_handle() {
    let service = Arc::new(CountingService::default());
    let resolver = resolver(Arc::default(), StubFactory::new(StubBackend::new(5)), service.clone());

    let backend = resolver
        .resolve(true, &profile(5), Some("device_a"), Some(&Credentials::new("valid")))
        .await
        .unwrap();
    assert_eq!(backend.capabilities().num_qubits, 27);
    assert_eq!(service.calls(), 1);
}
