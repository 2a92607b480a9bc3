//! Per-call request context
//!
//! Every API call carries a [`RequestContext`]: the cancellation handle for the
//! host operation, the server-variable table used to template the regional
//! base URL, and the retry policy. Contexts are cheap to clone and are never
//! mutated in place; deriving a context with a different region suffix copies
//! the table.

use crate::retry::RetryConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Server variable holding the regional top-level domain (e.g. `eu`, `com`).
pub const SUFFIX_VARIABLE: &str = "suffix";

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    server_variables: Arc<BTreeMap<String, String>>,
    retry: RetryConfig,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Copy of this context with an overall timeout replacing the retry budget
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut ctx = self.clone();
        ctx.retry = ctx.retry.with_timeout(timeout);
        ctx
    }

    /// Copy of this context with `name` bound to `value` in the server-variable table
    pub fn with_server_variable(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut variables = (*self.server_variables).clone();
        variables.insert(name.into(), value.into());

        Self {
            cancel: self.cancel.clone(),
            server_variables: Arc::new(variables),
            retry: self.retry.clone(),
        }
    }

    pub fn with_region_suffix(&self, suffix: impl Into<String>) -> Self {
        self.with_server_variable(SUFFIX_VARIABLE, suffix)
    }

    pub fn server_variable(&self, name: &str) -> Option<&str> {
        self.server_variables.get(name).map(String::as_str)
    }

    pub fn server_variables(&self) -> &BTreeMap<String, String> {
        &self.server_variables
    }

    pub fn region_suffix(&self) -> Option<&str> {
        self.server_variable(SUFFIX_VARIABLE)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }
}
