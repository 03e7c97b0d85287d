mod config;
mod core;
mod task;

pub use crate::config::{ClientConfig, PollConfig, RateLimitConfig};
pub use crate::core::domain::{
    error::{DirectorError, DirectorResult, RequestPhase, TransportError, ValidationError},
    model::{
        ToModel,
        api_response::ApiResponse,
        director_connection::DirectorConnection,
        stemcell::Stemcell,
        task::{Task, TaskState},
        vm_status::{
            CpuVitals, DiskUsage, DiskVitals, LoadAverage, MemoryVitals, VitalsResponse,
            VmStatus, VmStatusResponse,
        },
    },
    value_object::{DirectorAuth, DirectorPassword, DirectorUrl, DirectorUsername},
};
pub use crate::core::infrastructure::{
    api_client::ApiClient,
    transport::{DirectorRequest, DirectorResponse, ReqwestTransport, Transport},
};
pub use crate::task::application::service::{
    record_stream::{RawRecord, RecordStream, Records, split_records},
    result_aggregator::{BatchPolicy, decode_result_batch, decode_result_batch_with},
    task_poller::{TaskPoller, TaskResult},
};
pub use tokio_util::sync::CancellationToken;

use crate::core::domain::value_object::{
    validate_deployment_name, validate_password, validate_token, validate_url, validate_username,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A client for the BOSH director API
///
/// This client provides:
/// - Plain JSON endpoints (stemcells, task snapshots)
/// - Task-backed endpoints, where the director redirects to a task that is
///   polled to completion before its result output is decoded
///
/// # Examples
///
/// ```no_run
/// use bosh_director::{CancellationToken, DirectorClient, DirectorResult};
///
/// #[tokio::main]
/// async fn main() -> DirectorResult<()> {
///     let client = DirectorClient::builder()
///         .url("https://192.168.50.4:25555")?
///         .credentials("admin", "admin")?
///         .accept_invalid_certs(true)
///         .build()?;
///
///     let vms = client
///         .fetch_vms_status("cf-warden", &CancellationToken::new())
///         .await?;
///     for vm in vms {
///         println!("{}/{} {}", vm.job_name, vm.index, vm.job_state);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct DirectorClient {
    api_client: ApiClient,
    config: ClientConfig,
}

/// Builder for DirectorClient configuration
#[derive(Default)]
pub struct DirectorClientBuilder {
    url: Option<DirectorUrl>,
    auth: Option<DirectorAuth>,
    accept_invalid_certs: bool,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl DirectorClientBuilder {
    /// Sets the director base URL, e.g. `https://192.168.50.4:25555`.
    pub fn url(mut self, url: impl AsRef<str>) -> DirectorResult<Self> {
        let url = validate_url(url.as_ref())?;
        self.url = Some(DirectorUrl::new_unchecked(url));
        Ok(self)
    }

    /// Authenticates every request with HTTP basic auth.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> DirectorResult<Self> {
        let username = username.into();
        let password = password.into();
        validate_username(&username)?;
        validate_password(&password)?;
        self.auth = Some(DirectorAuth::Basic {
            username: DirectorUsername::new_unchecked(username),
            password: DirectorPassword::new_unchecked(password),
        });
        Ok(self)
    }

    /// Authenticates every request with a bearer token instead of basic auth.
    pub fn token(mut self, token: impl Into<String>) -> DirectorResult<Self> {
        let token = token.into();
        validate_token(&token)?;
        self.auth = Some(DirectorAuth::Bearer(DirectorPassword::new_unchecked(token)));
        Ok(self)
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Timeout for each individual HTTP exchange.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Initial delay between two polls of a running task.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval;
        self
    }

    /// Upper bound for the growing delay between polls.
    pub fn max_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.max_interval = interval;
        self
    }

    /// Gives up waiting for a task after `timeout`.
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll.timeout = Some(timeout);
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(rate_limit);
        self
    }

    /// Sends requests through `transport` instead of the built-in HTTP client.
    ///
    /// The URL, credentials, TLS, timeout and rate limit settings are then the
    /// transport's business.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> DirectorResult<DirectorClient> {
        if self.config.poll.interval.is_zero() {
            return Err(ValidationError::Field {
                field: "poll_interval".to_string(),
                message: "Poll interval must be greater than 0".to_string(),
            }
            .into());
        }
        if self.config.poll.max_interval < self.config.poll.interval {
            return Err(ValidationError::ConstraintViolation(
                "Maximum poll interval cannot be shorter than the poll interval".to_string(),
            )
            .into());
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let url = self.url.ok_or_else(|| ValidationError::Field {
                    field: "url".to_string(),
                    message: "URL is required".to_string(),
                })?;
                let connection = DirectorConnection::new(url, self.auth, self.accept_invalid_certs);
                Arc::new(ReqwestTransport::new(connection, &self.config)?)
            }
        };

        Ok(DirectorClient {
            api_client: ApiClient::new(transport),
            config: self.config,
        })
    }
}

impl fmt::Debug for DirectorClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorClientBuilder")
            .field("url", &self.url)
            .field("auth", &self.auth)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl DirectorClient {
    /// Creates a new builder for DirectorClient configuration
    pub fn builder() -> DirectorClientBuilder {
        DirectorClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Lists the stemcells uploaded to the director.
    ///
    /// # Errors
    /// Returns `DirectorError` if the request fails or the response is not a
    /// list of stemcells.
    pub async fn stemcells(&self) -> DirectorResult<Vec<Stemcell>> {
        self.api_client.get("/stemcells").await
    }

    /// Like [`DirectorClient::stemcells`], also returning the director's response.
    pub async fn stemcells_with_response(&self) -> DirectorResult<(Vec<Stemcell>, ApiResponse)> {
        self.api_client.get_with_response("/stemcells").await
    }

    /// Fetches the current snapshot of a task without waiting for it.
    pub async fn task(&self, id: u64) -> DirectorResult<Task> {
        self.api_client.get(&format!("/tasks/{id}")).await
    }

    /// Sends a request that starts a director task and waits for its result.
    ///
    /// # Errors
    /// See [`TaskPoller::poll_task`].
    pub async fn poll_task(
        &self,
        trigger: &DirectorRequest,
        cancel: &CancellationToken,
    ) -> DirectorResult<TaskResult> {
        TaskPoller::new(self.api_client.clone(), self.config.poll.clone())
            .poll_task(trigger, cancel)
            .await
    }

    /// Runs a task and decodes its result output as one `W` record per line.
    ///
    /// Returns the records together with the output response they were read from.
    ///
    /// # Errors
    /// Any error from [`DirectorClient::poll_task`], or `DirectorError::Decode`
    /// for the first result line that is not a valid `W`. The decode error
    /// carries the output response.
    pub async fn fetch_task_records<W>(
        &self,
        trigger: &DirectorRequest,
        cancel: &CancellationToken,
    ) -> DirectorResult<(Vec<W::Model>, ApiResponse)>
    where
        W: ToModel + DeserializeOwned,
    {
        let result = self.poll_task(trigger, cancel).await?;
        let records = decode_result_batch::<W>(split_records(&result.output))
            .map_err(|e| e.with_output_response(&result.response))?;
        debug!(task_id = result.task.id, records = records.len(), "decoded task result");
        Ok((records, result.response))
    }

    /// Returns the status and vitals of every VM in a deployment, in the
    /// order the director reports them.
    ///
    /// # Errors
    /// `DirectorError::Validation` for an invalid deployment name, otherwise
    /// any error from [`DirectorClient::fetch_task_records`].
    pub async fn fetch_vms_status(
        &self,
        deployment: &str,
        cancel: &CancellationToken,
    ) -> DirectorResult<Vec<VmStatus>> {
        self.fetch_vms_status_with_response(deployment, cancel)
            .await
            .map(|(vms, _)| vms)
    }

    /// Like [`DirectorClient::fetch_vms_status`], also returning the task
    /// output response.
    pub async fn fetch_vms_status_with_response(
        &self,
        deployment: &str,
        cancel: &CancellationToken,
    ) -> DirectorResult<(Vec<VmStatus>, ApiResponse)> {
        validate_deployment_name(deployment)?;
        let trigger = DirectorRequest::get(format!("/deployments/{deployment}/vms?format=full"));
        self.fetch_task_records::<VmStatusResponse>(&trigger, cancel)
            .await
    }
}

#[cfg(test)]
mod tests;
