use reqwest::StatusCode;
use std::time::{Duration, SystemTime};

/// Backoff parameters for transient backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry; doubled for every further attempt.
    pub base_delay: Duration,
    /// Upper bound for any single delay, server hints included.
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub const fn new(base_delay: Duration, max_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_retries,
        }
    }

    pub const fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 0)
    }

    /// Delay to wait before retrying, or `None` when the failure is final.
    ///
    /// `previous_attempts` counts retries already made for this request.
    pub fn next_delay(&self, failure: &RetryableFailure, previous_attempts: u32) -> Option<Duration> {
        if previous_attempts >= self.max_retries {
            return None;
        }

        let hint = match failure {
            RetryableFailure::Status { status, retry_after } => {
                if !is_retryable_status(*status) {
                    return None;
                }
                *retry_after
            }
            RetryableFailure::Network => None,
        };

        let delay = hint.unwrap_or_else(|| self.backoff(previous_attempts));
        Some(delay.min(self.max_delay))
    }

    fn backoff(&self, previous_attempts: u32) -> Duration {
        let factor = 1u32.checked_shl(previous_attempts).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(10), 3)
    }
}

/// Failure shapes that feed a retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableFailure {
    Status {
        status: StatusCode,
        retry_after: Option<Duration>,
    },
    Network,
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Parses an HTTP `Retry-After` value (delta seconds or HTTP date).
pub fn parse_retry_after(value: &str, now: SystemTime) -> Option<Duration> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let instant = httpdate::parse_http_date(trimmed).ok()?;
    Some(instant.duration_since(now).unwrap_or(Duration::ZERO))
}
