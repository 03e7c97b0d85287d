//! Raw HTTP outcome kept alongside results and errors for diagnostics.

use reqwest::StatusCode;

/// The status code and body of a director response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Builds a descriptor from a raw body, replacing invalid UTF-8.
    pub(crate) fn from_bytes(status: StatusCode, body: &[u8]) -> Self {
        Self::new(status, String::from_utf8_lossy(body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns `true` for any 2xx status.
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }
}
