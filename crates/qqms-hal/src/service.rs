//! Remote execution services and their credentials.
//!
//! A remote device is reached in two steps: authenticate against an
//! [`ExecutionService`] to open a [`ServiceSession`], then ask the session
//! for a handle to a named backend. Both steps may perform network I/O.

use std::fmt;

use async_trait::async_trait;

use crate::backend::ExecutionBackend;
use crate::error::{HalError, HalResult};

/// Environment variable holding the execution service API token.
pub const TOKEN_ENV: &str = "QQMS_API_TOKEN";

/// Legacy environment variable accepted when [`TOKEN_ENV`] is unset.
pub const LEGACY_TOKEN_ENV: &str = "IBM_QUANTUM_TOKEN";

/// Default service instance (hub/group/project).
pub const DEFAULT_INSTANCE: &str = "ibm-q/open/main";

/// Opaque credentials for an execution service.
#[derive(Clone)]
pub struct Credentials {
    token: String,
    instance: String,
}

impl Credentials {
    /// Create credentials for the default instance.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            instance: DEFAULT_INSTANCE.to_string(),
        }
    }

    /// Read the token from the environment.
    pub fn from_env() -> HalResult<Self> {
        std::env::var(TOKEN_ENV)
            .or_else(|_| std::env::var(LEGACY_TOKEN_ENV))
            .map(Self::new)
            .map_err(|_| {
                HalError::AuthenticationFailed(format!(
                    "no API token: set {TOKEN_ENV} (or {LEGACY_TOKEN_ENV})"
                ))
            })
    }

    /// Select a service instance.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// The raw token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The service instance.
    pub fn instance(&self) -> &str {
        &self.instance
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .finish()
    }
}

/// A remote execution service (cloud runtime, lab gateway, ...).
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Service name, for logs.
    fn name(&self) -> &str;

    /// Authenticate and open a session.
    async fn authenticate(&self, credentials: &Credentials) -> HalResult<Box<dyn ServiceSession>>;
}

/// An authenticated session against an [`ExecutionService`].
#[async_trait]
pub trait ServiceSession: Send + Sync {
    /// Obtain a handle to the backend named `backend_id`.
    ///
    /// MUST fail with [`HalError::BackendUnavailable`] when no such backend exists.
    async fn backend(&self, backend_id: &str) -> HalResult<Box<dyn ExecutionBackend>>;

    /// Names of the backends visible to this session.
    async fn list_backends(&self) -> HalResult<Vec<String>>;
}
