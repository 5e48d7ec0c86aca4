//! Execution service and authenticated sessions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qqms_hal::{Credentials, ExecutionBackend, ExecutionService, HalResult, ServiceSession};
use tracing::info;

use crate::api::{DEFAULT_ENDPOINT, RuntimeClient};
use crate::backend::{DEFAULT_REMOTE_POLL_INTERVAL, RuntimeBackend};

/// Remote execution service reached over REST.
#[derive(Debug, Clone)]
pub struct RuntimeService {
    endpoint: String,
    poll_interval: Duration,
}

impl RuntimeService {
    /// Service at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            poll_interval: DEFAULT_REMOTE_POLL_INTERVAL,
        }
    }

    /// Poll interval handed to backends opened through this service.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Service endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for RuntimeService {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl ExecutionService for RuntimeService {
    fn name(&self) -> &str {
        "runtime"
    }

    async fn authenticate(&self, credentials: &Credentials) -> HalResult<Box<dyn ServiceSession>> {
        info!(
            endpoint = %self.endpoint,
            instance = credentials.instance(),
            "authenticating with execution service"
        );
        let client = RuntimeClient::connect(&self.endpoint, credentials).await?;
        Ok(Box::new(RuntimeSession {
            client: Arc::new(client),
            poll_interval: self.poll_interval,
        }))
    }
}

/// Authenticated session against a [`RuntimeService`].
#[derive(Debug)]
pub struct RuntimeSession {
    client: Arc<RuntimeClient>,
    poll_interval: Duration,
}

#[async_trait]
impl ServiceSession for RuntimeSession {
    async fn backend(&self, backend_id: &str) -> HalResult<Box<dyn ExecutionBackend>> {
        let info = self.client.get_backend(backend_id).await?;
        info!(
            backend = %info.name,
            qubits = info.num_qubits,
            operational = info.operational,
            "resolved remote backend"
        );
        Ok(Box::new(
            RuntimeBackend::new(Arc::clone(&self.client), &info)
                .with_poll_interval(self.poll_interval),
        ))
    }

    async fn list_backends(&self) -> HalResult<Vec<String>> {
        Ok(self.client.list_backends().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qqms_hal::HalError;

    #[test]
    fn test_default_endpoint() {
        let service = RuntimeService::default();
        assert_eq!(service.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(service.name(), "runtime");
    }

    #[tokio::test]
    async fn test_unreachable_service_fails_authentication() {
        // Port 9 (discard) is closed on test hosts; the connection is refused.
        let service = RuntimeService::new("http://127.0.0.1:9");
        let err = service
            .authenticate(&Credentials::new("token"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, HalError::AuthenticationFailed(_)));
    }
}
