//! Tunables for the HTTP transport and the task poll loop.

use std::time::Duration;

/// Client-side rate limit applied before every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// How a task is polled until it reaches a terminal state.
///
/// The delay between polls starts at `interval` and doubles after each
/// non-terminal observation, never exceeding `max_interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_interval: Duration,
    /// Upper bound on the total time spent waiting for one task, including a
    /// poll request still in flight. `None` waits until the task finishes or
    /// the caller cancels.
    pub timeout: Option<Duration>,
}

impl PollConfig {
    pub(crate) fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_interval)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// Configuration shared by every request a client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Timeout for a single HTTP exchange.
    pub request_timeout: Duration,
    pub rate_limit: Option<RateLimitConfig>,
    pub poll: PollConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            rate_limit: None,
            poll: PollConfig::default(),
        }
    }
}
