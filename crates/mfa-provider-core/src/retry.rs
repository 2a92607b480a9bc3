//! Retry policy and the named retry predicates

use crate::api::ApiError;
use std::time::Duration;
use tracing::warn;

/// Message prefix returned while a freshly granted role is still propagating.
const ACTOR_NOT_AUTHORIZED_PREFIX: &str =
    "The actor attempting to perform the request is not authorized.";

/// Decides whether a failed call is worth retrying.
pub type Retryable = fn(&ApiError) -> bool;

/// Retry configuration for API calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,

    /// Overall budget for one operation, retries included
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            timeout: Duration::from_secs(600),
        }
    }
}

impl RetryConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Delay to wait for a given error, honouring `Retry-After` on 429
    pub fn delay_for(&self, error: &ApiError, attempt: u32) -> Duration {
        match error {
            ApiError::Status {
                status: 429,
                retry_after: Some(retry_after),
                ..
            } => (*retry_after).min(self.max_delay),
            _ => self.backoff(attempt),
        }
    }
}

fn is_transient(error: &ApiError) -> bool {
    match error {
        ApiError::Transport(_) => true,
        ApiError::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
        ApiError::Decode(_) | ApiError::Cancelled => false,
    }
}

/// Retries transient transport failures only.
pub fn default_retryable(error: &ApiError) -> bool {
    if is_transient(error) {
        warn!(error = %error, "Transient API failure detected, retrying");
        return true;
    }
    false
}

/// Retries transient failures plus the eventual-consistency errors seen
/// right after an environment or role has been created.
pub fn default_create_read_retryable(error: &ApiError) -> bool {
    if default_retryable(error) {
        return true;
    }

    if error.status_code() == Some(403)
        && error
            .message()
            .is_some_and(|m| m.starts_with(ACTOR_NOT_AUTHORIZED_PREFIX))
    {
        warn!("Insufficient privileges detected, likely role propagation delay, retrying");
        return true;
    }

    false
}
