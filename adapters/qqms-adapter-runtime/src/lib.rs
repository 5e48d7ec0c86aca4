//! QQMS Remote Execution Service Adapter
//!
//! Runs delay-sweep experiments on devices behind a REST execution service.
//!
//! # Authentication
//!
//! [`RuntimeService::authenticate`] exchanges the API token from
//! [`qqms_hal::Credentials`] for a session token. The token is read from
//! `QQMS_API_TOKEN` (or `IBM_QUANTUM_TOKEN`) by `Credentials::from_env`.
//!
//! # Example
//!
//! ```ignore
//! use qqms_adapter_runtime::RuntimeService;
//! use qqms_hal::{Credentials, ExecutionService};
//!
//! let session = RuntimeService::default()
//!     .authenticate(&Credentials::from_env()?)
//!     .await?;
//! let backend = session.backend("ibm_kyoto").await?;
//! println!("{} qubits", backend.capabilities().num_qubits);
//! ```

mod api;
mod backend;
mod error;
mod service;

pub use api::{BackendInfo, DEFAULT_ENDPOINT, RuntimeClient};
pub use backend::{DEFAULT_REMOTE_POLL_INTERVAL, RuntimeBackend};
pub use error::{RuntimeError, RuntimeResult};
pub use service::{RuntimeService, RuntimeSession};
