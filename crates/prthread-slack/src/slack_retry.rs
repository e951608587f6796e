use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;

const MAX_BACKOFF_DOUBLINGS: u32 = 6;

/// Attempt budget and backoff for Slack Web API calls.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlackRetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl SlackRetryPolicy {
    pub(crate) fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms.max(1)),
        }
    }

    /// `attempt` is 1-based; only rate limits and server errors are retried.
    pub(crate) fn should_retry(&self, attempt: usize, status: StatusCode) -> bool {
        attempt < self.max_attempts
            && (status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error())
    }

    /// Slack's `Retry-After` seconds win over the doubling backoff.
    pub(crate) fn delay_before_retry(&self, attempt: usize, headers: &HeaderMap) -> Duration {
        let retry_after = headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        match retry_after {
            Some(seconds) => Duration::from_secs(seconds),
            None => {
                let doublings = (attempt.saturating_sub(1) as u32).min(MAX_BACKOFF_DOUBLINGS);
                self.base_delay.saturating_mul(1 << doublings)
            }
        }
    }
}

pub(crate) fn truncate_for_error(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
