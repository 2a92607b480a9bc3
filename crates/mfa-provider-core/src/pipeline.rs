//! Response pipeline
//!
//! [`invoke`] wraps every API call: it retries failures the active predicate
//! classifies as retryable, maps the final error through an [`ErrorMapper`]
//! into diagnostics and hands back the typed value on success.

use crate::api::{ApiError, ApiResult, ErrorBody};
use crate::context::RequestContext;
use crate::diag::{Diagnostic, Diagnostics};
use crate::retry::Retryable;
use std::future::Future;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

const NOT_FOUND_SUMMARY: &str = "Requested resource not found";
const NOT_FOUND_DETAIL: &str = "The requested resource configuration cannot be found in the remote service.  If the requested resource is managed in state, it may have been removed outside of the provider.";

/// Custom error hook. Returning `None` falls back to the default formatting.
pub type CustomErrorFn = fn(&ApiError) -> Option<Diagnostics>;

/// How a failed call is turned into diagnostics
#[derive(Debug, Clone, Copy, Default)]
pub enum ErrorMapper {
    /// Every failure is fatal
    #[default]
    Default,
    /// Not-found becomes a warning and the call yields no value
    ResourceNotFoundWarning,
    /// Resource-specific handling, falling back to [`ErrorMapper::Default`]
    Custom(CustomErrorFn),
}

impl ErrorMapper {
    pub fn map(&self, operation: &str, error: &ApiError) -> Diagnostics {
        match self {
            ErrorMapper::Default => format_api_error(operation, error).into(),
            ErrorMapper::ResourceNotFoundWarning => {
                if error.is_not_found() {
                    let summary = error.message().unwrap_or(NOT_FOUND_SUMMARY);
                    Diagnostic::warning(summary, NOT_FOUND_DETAIL).into()
                } else {
                    format_api_error(operation, error).into()
                }
            }
            ErrorMapper::Custom(custom) => {
                custom(error).unwrap_or_else(|| format_api_error(operation, error).into())
            }
        }
    }
}

/// Call `call` under the context's retry policy and map its outcome.
///
/// Returns `(None, diags)` when the call failed. `diags` holds only warnings
/// when the mapper downgraded the failure.
#[instrument(level = "debug", skip_all, fields(operation = operation))]
pub async fn invoke<T, F, Fut>(
    ctx: &RequestContext,
    operation: &str,
    mapper: ErrorMapper,
    retryable: Option<Retryable>,
    call: F,
) -> (Option<T>, Diagnostics)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    match call_with_retry(ctx, operation, retryable, call).await {
        Ok(response) => {
            debug!(status = response.status, "API call succeeded");
            (Some(response.value), Diagnostics::new())
        }
        Err(error) => (None, mapper.map(operation, &error)),
    }
}

/// Call `call` under the context's retry policy, returning the last error
/// unmapped. `None` for `retryable` means a single attempt.
pub async fn call_with_retry<T, F, Fut>(
    ctx: &RequestContext,
    operation: &str,
    retryable: Option<Retryable>,
    mut call: F,
) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let policy = ctx.retry();
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        attempt += 1;

        let error = match call().await {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        let Some(retryable) = retryable else {
            return Err(error);
        };
        if !retryable(&error) {
            return Err(error);
        }
        if attempt >= policy.max_attempts {
            warn!(operation, attempt, "Retry attempts exhausted");
            return Err(error);
        }

        let wait = policy.delay_for(&error, attempt);
        if started.elapsed() + wait > policy.timeout {
            warn!(
                operation,
                attempt,
                timeout_ms = policy.timeout.as_millis() as u64,
                "Retry timeout reached"
            );
            return Err(error);
        }

        warn!(
            operation,
            attempt,
            wait_ms = wait.as_millis() as u64,
            error = %error,
            "API call failed, retrying"
        );

        tokio::select! {
            _ = ctx.cancellation().cancelled() => return Err(ApiError::Cancelled),
            _ = tokio::time::sleep(wait) => {}
        }
    }
}

/// Replace a 400/401/403 with an environment-not-found error when the
/// environment the call was scoped to has disappeared.
///
/// `probe` reads the environment; it is only awaited on a permission error.
pub async fn check_environment_exists_on_permissions_error<T, P, PFut>(
    environment_id: &str,
    result: ApiResult<T>,
    probe: P,
) -> ApiResult<T>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = ApiResult<()>>,
{
    match result {
        Err(error) if error.is_permission_error() => match probe().await {
            Err(probe_error) if probe_error.is_not_found() => {
                warn!(environment_id, "Environment not found after permission error");
                Err(environment_gone(environment_id, probe_error))
            }
            _ => Err(error),
        },
        other => other,
    }
}

fn environment_gone(environment_id: &str, probe_error: ApiError) -> ApiError {
    match probe_error {
        ApiError::Status {
            status,
            body: Some(body),
            retry_after,
        } => ApiError::Status {
            status,
            body: Some(body),
            retry_after,
        },
        _ => ApiError::status(
            404,
            Some(ErrorBody::new(
                "NOT_FOUND",
                format!("The environment {} could not be found.", environment_id),
            )),
        ),
    }
}

/// Format a failed call into a fatal diagnostic
pub fn format_api_error(operation: &str, error: &ApiError) -> Diagnostic {
    match error {
        ApiError::Status {
            body: Some(body), ..
        } => {
            let message = body.message.as_deref().unwrap_or_default();
            Diagnostic::error(
                format!("Error when calling `{}`: {}", operation, message),
                format_error_body(body),
            )
        }
        ApiError::Status { status, .. } => Diagnostic::error(
            format!("Error when calling `{}`: HTTP {}", operation, status),
            format!(
                "The service returned HTTP status {} without an error body.",
                status
            ),
        ),
        ApiError::Transport(message) => Diagnostic::error(
            format!("Error when calling `{}`: {}", operation, message),
            "The request failed before a response was received.",
        ),
        ApiError::Decode(message) => Diagnostic::error(
            format!("Error when calling `{}`: {}", operation, error),
            format!("A generic error has occurred.\nError details: {}", message),
        ),
        ApiError::Cancelled => Diagnostic::error(
            format!("Error when calling `{}`: request cancelled", operation),
            "The operation was cancelled before it completed.",
        ),
    }
}

fn format_error_body(body: &ErrorBody) -> String {
    let mut text = format!(
        "API Error Details:\nID:\t\t{}\nCode:\t\t{}\nMessage:\t{}",
        body.id.as_deref().unwrap_or_default(),
        body.code.as_deref().unwrap_or_default(),
        body.message.as_deref().unwrap_or_default()
    );

    if body.details.is_empty() {
        return text;
    }

    let details: Vec<String> = body
        .details
        .iter()
        .map(|detail| {
            let mut lines = String::new();
            let mut marker = "-";

            let mut push = |label: &str, value: &str| {
                lines.push_str(&format!("  {} {}:\t{}\n", marker, label, value));
                marker = " ";
            };
            if let Some(code) = &detail.code {
                push("Code", code);
            }
            if let Some(message) = &detail.message {
                push("Message", message);
            }
            if let Some(target) = &detail.target {
                push("Target", target);
            }

            if let Some(inner) = &detail.inner_error {
                let mut data = String::new();
                if let Some(v) = inner.range_minimum_value {
                    data.push_str(&format!("      Range Min Value:\t{}\n", v));
                }
                if let Some(v) = inner.range_maximum_value {
                    data.push_str(&format!("      Range Max Value:\t{}\n", v));
                }
                if let Some(v) = &inner.allowed_pattern {
                    data.push_str(&format!("      Allowed Pattern:\t{}\n", v));
                }
                if let Some(v) = &inner.allowed_values {
                    data.push_str(&format!("      Allowed Values:\t[{}]\n", v.join(", ")));
                }
                if let Some(v) = inner.maximum_value {
                    data.push_str(&format!("      Max Value:\t{}\n", v));
                }
                if let Some(v) = &inner.referenced_values {
                    data.push_str(&format!("      Referenced Values:\t[{}]\n", v.join(", ")));
                }
                lines.push_str(&format!("  {} Data:\n{}", marker, data));
            }

            lines
        })
        .collect();

    text.push_str(&format!("\nDetails:\n{}", details.join("\n")));
    text
}
