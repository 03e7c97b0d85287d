//! The single HTTP exchange every director operation is built on.

use crate::{
    ClientConfig, DirectorConnection, DirectorError, DirectorResult, TransportError,
    ValidationError,
    core::domain::{
        error::RequestPhase, model::api_response::ApiResponse, value_object::DirectorAuth,
    },
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    Client, Method, StatusCode,
    header::{HeaderMap, LOCATION},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// A request against the director API.
///
/// `path` is relative to the director base URL and may carry a query string.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
}

impl DirectorRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Attaches a JSON body, sent with `Content-Type: application/json`.
    pub fn with_json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// Status, headers and raw body of a director response.
#[derive(Debug, Clone)]
pub struct DirectorResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl DirectorResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Returns `true` for the redirect statuses the director uses to point at a task.
    pub fn is_redirect(&self) -> bool {
        matches!(
            self.status,
            StatusCode::MOVED_PERMANENTLY
                | StatusCode::FOUND
                | StatusCode::SEE_OTHER
                | StatusCode::TEMPORARY_REDIRECT
                | StatusCode::PERMANENT_REDIRECT
        )
    }

    /// The `Location` header, if present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION)?.to_str().ok()
    }

    pub fn to_api_response(&self) -> ApiResponse {
        ApiResponse::from_bytes(self.status, &self.body)
    }
}

/// Sends one request to the director and returns whatever it answered.
///
/// Implementations must not follow redirects: task-triggering endpoints
/// answer with a redirect that callers need to observe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &DirectorRequest) -> Result<DirectorResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`, with optional client-side rate limiting.
#[derive(Debug)]
pub struct ReqwestTransport {
    http_client: Client,
    connection: Arc<DirectorConnection>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ReqwestTransport {
    /// Creates a new transport for the given connection.
    ///
    /// # Errors
    /// Returns `DirectorError::Validation` for a zero rate limit and
    /// `DirectorError::Transport` if the HTTP client cannot be built.
    pub fn new(connection: DirectorConnection, config: &ClientConfig) -> DirectorResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accept_invalid_certs())
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DirectorError::Transport {
                phase: RequestPhase::Request,
                source: TransportError::from_reqwest("failed to build HTTP client", e),
            })?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = non_zero("requests_per_second", rl.requests_per_second)?;
                let burst = non_zero("burst_size", rl.burst_size)?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            rate_limiter,
        })
    }
}

fn non_zero(field: &str, value: u32) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(value).ok_or_else(|| ValidationError::Field {
        field: field.to_string(),
        message: "Rate limit values must be greater than 0".to_string(),
    })
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &DirectorRequest) -> Result<DirectorResponse, TransportError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.url().endpoint(request.path());
        let mut req_builder = self.http_client.request(request.method().clone(), &url);

        req_builder = match self.connection.auth() {
            Some(DirectorAuth::Basic { username, password }) => {
                req_builder.basic_auth(username.as_str(), Some(password.as_str()))
            }
            Some(DirectorAuth::Bearer(token)) => req_builder.bearer_auth(token.as_str()),
            None => req_builder,
        };

        if let Some(body) = request.body() {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest("HTTP request failed", e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest("failed to read response body", e))?;

        Ok(DirectorResponse::new(status, headers, body.to_vec()))
    }
}
