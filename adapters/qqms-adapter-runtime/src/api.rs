//! Execution service REST client.
//!
//! Covers the calls a calibration sweep needs:
//! - Token exchange (`POST /v1/auth/token`)
//! - Backend lookup (`GET /v1/backends`, `GET /v1/backends/{name}`)
//! - Experiment submission (`POST /v1/experiments`)
//! - Job polling and results (`GET /v1/jobs/{id}`, `GET /v1/jobs/{id}/results`)

// Response fields mirror the service contract; not all are read yet.
#![allow(dead_code)]

use std::fmt;
use std::time::Duration;

use qqms_hal::{Credentials, ExperimentDescriptor};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

/// Default execution service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.quantum-computing.ibm.com/runtime";

/// User-Agent sent with requests.
const USER_AGENT: &str = concat!("qqms/", env!("CARGO_PKG_VERSION"));

/// Program that runs delay-sweep experiments server side.
const CALIBRATION_PROGRAM: &str = "calibration";

/// Execution service API client.
pub struct RuntimeClient {
    /// HTTP client carrying the bearer token.
    client: Client,
    /// API endpoint URL.
    endpoint: String,
    /// Selected instance (hub/group/project).
    instance: String,
}

impl fmt::Debug for RuntimeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .finish()
    }
}

/// Token exchange request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    api_token: &'a str,
}

/// Token exchange response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Bearer token for subsequent calls.
    id: String,
    /// Lifetime in seconds.
    #[serde(default)]
    ttl: Option<u64>,
}

impl RuntimeClient {
    /// Exchange the API token in `credentials` for a session token.
    pub async fn connect(
        endpoint: impl Into<String>,
        credentials: &Credentials,
    ) -> RuntimeResult<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let auth_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let response = auth_client
            .post(format!("{endpoint}/v1/auth/token"))
            .json(&TokenRequest {
                api_token: credentials.token(),
            })
            .send()
            .await
            .map_err(|e| RuntimeError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RuntimeError::TokenExchange(format!(
                "service rejected the API token ({status})"
            )));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(RuntimeError::TokenExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            RuntimeError::TokenExchange(format!("failed to parse token response: {e}"))
        })?;
        tracing::debug!(ttl = ?token.ttl, "token exchange succeeded");

        Self::with_token(endpoint, &token.id, credentials.instance())
    }

    /// Build a client from an already-exchanged bearer token.
    pub fn with_token(
        endpoint: impl Into<String>,
        bearer: &str,
        instance: impl Into<String>,
    ) -> RuntimeResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {bearer}"))
                .map_err(|_| RuntimeError::InvalidToken)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            instance: instance.into(),
        })
    }

    /// API endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Selected instance.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Names of the backends visible to this instance.
    pub async fn list_backends(&self) -> RuntimeResult<Vec<String>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let list: BackendsResponse = response.json().await?;
        Ok(list.backends.into_iter().map(|b| b.name).collect())
    }

    /// Get details for a specific backend.
    pub async fn get_backend(&self, name: &str) -> RuntimeResult<BackendInfo> {
        let url = format!("{}/v1/backends/{}", self.endpoint, name);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Err(RuntimeError::BackendUnavailable(name.to_string()));
            }
            return Err(api_error(response).await);
        }

        response.json().await.map_err(RuntimeError::from)
    }

    /// Submit a delay-sweep experiment to `backend`.
    pub async fn submit_experiment(
        &self,
        backend: &str,
        experiment: &ExperimentDescriptor,
    ) -> RuntimeResult<SubmitResponse> {
        let url = format!("{}/v1/experiments", self.endpoint);
        let request = ExperimentRequest::new(backend, &self.instance, experiment);

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response.json().await.map_err(RuntimeError::from)
    }

    /// Get job status.
    pub async fn get_job_status(&self, job_id: &str) -> RuntimeResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Err(RuntimeError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response).await);
        }

        response.json().await.map_err(RuntimeError::from)
    }

    /// Get job results.
    pub async fn get_job_results(&self, job_id: &str) -> RuntimeResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == StatusCode::NOT_FOUND {
                return Err(RuntimeError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response).await);
        }

        response.json().await.map_err(RuntimeError::from)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> RuntimeResult<()> {
        let url = format!("{}/v1/jobs/{}/cancel", self.endpoint, job_id);
        let response = self.client.post(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

/// Turn a non-success response into [`RuntimeError::ApiError`].
async fn api_error(response: reqwest::Response) -> RuntimeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(err) => RuntimeError::ApiError {
            code: err.code,
            message: err.message,
        },
        Err(_) => RuntimeError::ApiError {
            code: Some(status.as_u16().to_string()),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        },
    }
}

// ============================================================================
// Request types
// ============================================================================

/// Experiment submission request.
#[derive(Debug, Serialize)]
struct ExperimentRequest<'a> {
    /// Server-side program.
    program_id: &'static str,
    /// Backend name.
    backend: &'a str,
    /// Instance (hub/group/project).
    hub: &'a str,
    /// Experiment parameters.
    params: ExperimentParams<'a>,
}

/// Delay-sweep parameters.
#[derive(Debug, Serialize)]
struct ExperimentParams<'a> {
    /// Calibration sequence (`t1` or `t2_hahn`).
    experiment: &'static str,
    /// Physical qubit.
    qubit: u32,
    /// Delays in seconds.
    delays: &'a [f64],
    /// Scheduling policy.
    scheduling_method: String,
    /// Shots per delay.
    shots: u32,
}

impl<'a> ExperimentRequest<'a> {
    fn new(backend: &'a str, hub: &'a str, experiment: &'a ExperimentDescriptor) -> Self {
        Self {
            program_id: CALIBRATION_PROGRAM,
            backend,
            hub,
            params: ExperimentParams {
                experiment: experiment.model().sequence_name(),
                qubit: experiment.qubit(),
                delays: experiment.delays().values(),
                scheduling_method: experiment.scheduling().to_string(),
                shots: experiment.shots(),
            },
        }
    }
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    /// Error code.
    #[serde(default)]
    code: Option<String>,
    /// Error message.
    #[serde(default)]
    message: String,
}

/// Backend listing response.
#[derive(Debug, Deserialize)]
struct BackendsResponse {
    backends: Vec<BackendEntry>,
}

/// An entry in the backend listing.
#[derive(Debug, Deserialize)]
struct BackendEntry {
    name: String,
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Whether the backend is accepting jobs.
    #[serde(default = "default_operational")]
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

fn default_operational() -> bool {
    true
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Job status.
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status (case varies between service versions).
    pub status: String,
    /// Failure details.
    #[serde(default)]
    pub error: Option<JobError>,
}

/// Job error information.
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

impl JobStatusResponse {
    /// Failure message, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.message.clone())
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// Job ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Analysis results, by name.
    #[serde(default)]
    pub analysis_results: Vec<AnalysisEntry>,
    /// Execution time in milliseconds.
    #[serde(default)]
    pub execution_time_ms: Option<u64>,
}

/// One analysis result as reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisEntry {
    /// Result name (e.g. `"T1"`).
    pub name: String,
    /// Nominal value.
    #[serde(default)]
    pub value: Option<f64>,
    /// Standard error of `value`.
    #[serde(default)]
    pub stderr: Option<f64>,
    /// Unit.
    #[serde(default)]
    pub unit: Option<String>,
    /// Reduced chi-squared.
    #[serde(default)]
    pub chisq: Option<f64>,
    /// Quality flag (`good` / `bad`).
    #[serde(default)]
    pub quality: Option<String>,
}
