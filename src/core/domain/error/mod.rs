use crate::core::domain::model::{api_response::ApiResponse, task::TaskState};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The main error type for director operations.
///
/// Every failure surfaced by the client ends up here. Variants that originate
/// from an HTTP exchange keep the raw [`ApiResponse`] so callers can inspect
/// the status and body that caused them.
#[derive(Error, Debug)]
pub enum DirectorError {
    /// The HTTP exchange itself failed (network, DNS, TLS, request timeout).
    ///
    /// # Fields
    /// * `phase` - Which step of the operation was talking to the director
    /// * `source` - The underlying transport failure
    #[error("Transport error during {phase}: {source}")]
    Transport {
        phase: RequestPhase,
        #[source]
        source: TransportError,
    },

    /// The director answered, but not the way the protocol requires.
    ///
    /// Covers unexpected status codes, a missing or malformed `Location`
    /// header and task bodies that are not valid JSON.
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        response: Option<ApiResponse>,
    },

    /// A task reached a terminal state other than `done`.
    #[error("Task {id} finished in state '{state}': {description}")]
    TaskFailed {
        id: u64,
        state: TaskState,
        description: String,
        response: ApiResponse,
    },

    /// One line of a result stream could not be decoded.
    ///
    /// # Fields
    /// * `line` - 0-based line index in the raw output body
    /// * `source` - The JSON error for that line
    /// * `response` - The output response the line came from, once known
    #[error("Failed to decode result record on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
        response: Option<ApiResponse>,
    },

    /// Polling was stopped through the caller's cancellation token.
    #[error("Polling of task {task_id} was cancelled")]
    Cancelled { task_id: u64 },

    /// Polling exceeded the configured overall poll timeout.
    #[error("Task {task_id} did not finish within {waited:?}")]
    PollTimeout { task_id: u64, waited: Duration },

    /// Represents validation failures of client configuration or inputs
    #[error("Validation error: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },
}

impl DirectorError {
    pub(crate) fn protocol(message: impl Into<String>, response: Option<ApiResponse>) -> Self {
        DirectorError::Protocol {
            message: message.into(),
            response,
        }
    }

    /// Returns the raw HTTP response associated with this error, if any.
    pub fn api_response(&self) -> Option<&ApiResponse> {
        match self {
            DirectorError::Protocol { response, .. } => response.as_ref(),
            DirectorError::TaskFailed { response, .. } => Some(response),
            DirectorError::Decode { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    /// Attaches the response a result stream was read from to a decode error
    /// that does not carry one yet. Other errors pass through unchanged.
    pub(crate) fn with_output_response(self, output: &ApiResponse) -> Self {
        match self {
            DirectorError::Decode {
                line,
                source,
                response: None,
            } => DirectorError::Decode {
                line,
                source,
                response: Some(output.clone()),
            },
            other => other,
        }
    }
}

/// The step of an operation during which an HTTP exchange happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// A plain request against a synchronous endpoint.
    Request,
    /// The request expected to redirect to a task.
    Trigger,
    /// Fetching the task resource while waiting for a terminal state.
    Poll,
    /// Fetching the task's result output.
    Output,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            RequestPhase::Request => "request",
            RequestPhase::Trigger => "task trigger",
            RequestPhase::Poll => "task poll",
            RequestPhase::Output => "task output fetch",
        };
        f.write_str(phase)
    }
}

/// A failure to complete an HTTP exchange with the director.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<reqwest::Error>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn from_reqwest(context: &str, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("{context}: request timed out")
        } else {
            format!("{context}: {error}")
        };
        Self {
            message,
            source: Some(error),
        }
    }

    /// Returns `true` when the failure was a request timeout.
    pub fn is_timeout(&self) -> bool {
        self.source.as_ref().is_some_and(reqwest::Error::is_timeout)
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a DirectorError
pub type DirectorResult<T> = Result<T, DirectorError>;
