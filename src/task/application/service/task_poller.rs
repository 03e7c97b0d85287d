//! Following a director redirect to a task and waiting for its result.
//!
//! Long-running director operations answer with a redirect to `/tasks/{id}`.
//! The poller fetches that task until it reaches a terminal state and, on
//! success, downloads its result output. Each call owns its own loop; nothing
//! is shared between polls.

use crate::{
    DirectorError, DirectorResult, PollConfig,
    core::domain::{
        error::RequestPhase,
        model::{api_response::ApiResponse, task::Task},
    },
    core::infrastructure::{
        api_client::{ApiClient, decode_json, ensure_success},
        transport::{DirectorRequest, DirectorResponse},
    },
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// A finished task together with its raw result output.
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// The last observed snapshot, in state `done`.
    pub task: Task,
    /// Body of `/tasks/{id}/output?type=result`.
    pub output: Vec<u8>,
    /// The output response, for diagnostics.
    pub response: ApiResponse,
}

/// Drives one task from its triggering request to its result output.
#[derive(Debug, Clone)]
pub struct TaskPoller {
    api: ApiClient,
    config: PollConfig,
}

impl TaskPoller {
    pub fn new(api: ApiClient, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Sends `trigger`, follows the redirect to the task it started, waits for
    /// the task to finish and fetches its result output.
    ///
    /// Waiting for the task, including a poll request in flight, stops early
    /// when `cancel` fires or the configured poll timeout elapses.
    ///
    /// # Errors
    /// - `Transport` if any exchange fails, tagged with the phase it failed in
    /// - `Protocol` if the trigger does not redirect to a task, or a task or
    ///   output response is malformed
    /// - `TaskFailed` if the task ends in any state other than `done`
    /// - `Cancelled` / `PollTimeout` if waiting was cut short
    pub async fn poll_task(
        &self,
        trigger: &DirectorRequest,
        cancel: &CancellationToken,
    ) -> DirectorResult<TaskResult> {
        let response = self.api.send(RequestPhase::Trigger, trigger).await?;
        if !response.is_redirect() {
            return Err(DirectorError::protocol(
                format!("expected redirect to task, got status {}", response.status()),
                Some(response.to_api_response()),
            ));
        }
        let task_id = task_id_from_redirect(&response)?;
        debug!(task_id, "following redirect to task");

        let task = self.wait_for_task(task_id, cancel).await?;

        let output_request = DirectorRequest::get(format!("/tasks/{task_id}/output?type=result"));
        let output = self.api.send(RequestPhase::Output, &output_request).await?;
        ensure_success(&output_request, &output)?;
        info!(task_id, bytes = output.body().len(), "task result fetched");

        Ok(TaskResult {
            task,
            response: output.to_api_response(),
            output: output.into_body(),
        })
    }

    /// Fetches the task until it leaves `queued`/`processing`.
    async fn wait_for_task(&self, task_id: u64, cancel: &CancellationToken) -> DirectorResult<Task> {
        let request = DirectorRequest::get(format!("/tasks/{task_id}"));
        let started = Instant::now();
        let deadline = self.config.timeout.map(|timeout| started + timeout);
        let mut delay = self.config.interval;
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DirectorError::Cancelled { task_id }),
                _ = sleep_until_deadline(deadline) => {
                    return Err(DirectorError::PollTimeout { task_id, waited: started.elapsed() });
                }
                response = self.api.send(RequestPhase::Poll, &request) => response?,
            };
            let task: Task = decode_json(&request, &response)?;
            if task.id != task_id {
                return Err(DirectorError::protocol(
                    format!("polled task {task_id} but the director answered for task {}", task.id),
                    Some(response.to_api_response()),
                ));
            }
            debug!(task_id, attempt, state = %task.state, "polled task");

            if task.state.is_success() {
                info!(task_id, attempt, "task finished");
                return Ok(task);
            }
            if !task.state.is_pending() {
                warn!(task_id, state = %task.state, description = %task.description, "task failed");
                return Err(DirectorError::TaskFailed {
                    id: task.id,
                    state: task.state,
                    description: task.description,
                    response: response.to_api_response(),
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(task_id, "task polling cancelled");
                    return Err(DirectorError::Cancelled { task_id });
                }
                _ = sleep_until_deadline(deadline) => {
                    return Err(DirectorError::PollTimeout {
                        task_id,
                        waited: started.elapsed(),
                    });
                }
                _ = tokio::time::sleep(delay) => {}
            }
            delay = self.config.next_delay(delay);
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Extracts the task id from a redirect's `Location` header.
///
/// Accepts absolute (`https://host/tasks/12`) and relative (`/tasks/12`)
/// targets. The host of an absolute target is ignored; the task is always
/// fetched from the configured director.
fn task_id_from_redirect(response: &DirectorResponse) -> DirectorResult<u64> {
    let invalid = |message: String| DirectorError::protocol(message, Some(response.to_api_response()));

    let location = response
        .location()
        .ok_or_else(|| invalid("redirect to task is missing a Location header".to_string()))?;

    let path = match Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(e) => return Err(invalid(format!("malformed task location '{location}': {e}"))),
    };

    path.trim_end_matches('/')
        .strip_prefix("/tasks/")
        .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|id| id.parse::<u64>().ok())
        .ok_or_else(|| invalid(format!("redirect target '{location}' is not a task")))
}
