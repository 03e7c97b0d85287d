//! Shared request/decode primitive used by every director operation.

use crate::{
    DirectorError, DirectorResult,
    core::domain::{error::RequestPhase, model::api_response::ApiResponse},
    core::infrastructure::transport::{DirectorRequest, DirectorResponse, Transport},
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Sends requests through a [`Transport`] and turns raw responses into typed values.
///
/// Cloning is cheap; clones share the same transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Sends a request and returns the raw response, whatever its status.
    ///
    /// # Errors
    /// Returns `DirectorError::Transport` tagged with `phase` if the exchange fails.
    pub async fn send(
        &self,
        phase: RequestPhase,
        request: &DirectorRequest,
    ) -> DirectorResult<DirectorResponse> {
        debug!(%phase, method = %request.method(), path = request.path(), "sending director request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| DirectorError::Transport { phase, source })?;

        debug!(
            %phase,
            status = response.status().as_u16(),
            bytes = response.body().len(),
            "director responded"
        );
        Ok(response)
    }

    /// Performs a GET request against a synchronous endpoint and decodes its JSON body.
    ///
    /// # Errors
    /// Returns `DirectorError` if the request fails, the status is not 2xx,
    /// or the body cannot be parsed.
    pub async fn get<T>(&self, path: &str) -> DirectorResult<T>
    where
        T: DeserializeOwned,
    {
        self.get_with_response(path).await.map(|(value, _)| value)
    }

    /// Like [`ApiClient::get`], also returning the response the value was decoded from.
    pub async fn get_with_response<T>(&self, path: &str) -> DirectorResult<(T, ApiResponse)>
    where
        T: DeserializeOwned,
    {
        let request = DirectorRequest::get(path);
        let response = self.send(RequestPhase::Request, &request).await?;
        let value = decode_json(&request, &response)?;
        Ok((value, response.to_api_response()))
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

/// Rejects non-2xx responses, then decodes the body as a single JSON document.
pub(crate) fn decode_json<T>(
    request: &DirectorRequest,
    response: &DirectorResponse,
) -> DirectorResult<T>
where
    T: DeserializeOwned,
{
    ensure_success(request, response)?;
    serde_json::from_slice(response.body()).map_err(|e| {
        DirectorError::protocol(
            format!("Failed to parse response from {}: {}", request.path(), e),
            Some(response.to_api_response()),
        )
    })
}

/// Fails with a protocol error carrying the response unless the status is 2xx.
pub(crate) fn ensure_success(
    request: &DirectorRequest,
    response: &DirectorResponse,
) -> DirectorResult<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(DirectorError::protocol(
        format!(
            "API error ({}) for {} {}",
            response.status(),
            request.method(),
            request.path()
        ),
        Some(response.to_api_response()),
    ))
}
