//! API call outcome types shared by the client and the response pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A successful API response: the decoded value plus the HTTP status it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub value: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, value: T) -> Self {
        Self { status, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            value: f(self.value),
        }
    }
}

/// Result of a single API call
pub type ApiResult<T> = std::result::Result<ApiResponse<T>, ApiError>;

/// A failed API call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced an HTTP response (connect, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status
    #[error("HTTP {status}: {}", .body.as_ref().and_then(|b| b.message.as_deref()).unwrap_or("no error body"))]
    Status {
        status: u16,
        body: Option<ErrorBody>,
        retry_after: Option<Duration>,
    },

    /// A 2xx response whose body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The operation was cancelled by the caller
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn status(status: u16, body: Option<ErrorBody>) -> Self {
        ApiError::Status {
            status,
            body,
            retry_after: None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Error code from the service error body (e.g. `NOT_FOUND`)
    pub fn code(&self) -> Option<&str> {
        self.body().and_then(|b| b.code.as_deref())
    }

    pub fn message(&self) -> Option<&str> {
        self.body().and_then(|b| b.message.as_deref())
    }

    pub fn first_detail(&self) -> Option<&ErrorDetail> {
        self.body().and_then(|b| b.details.first())
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404) || self.code() == Some("NOT_FOUND")
    }

    pub fn is_permission_error(&self) -> bool {
        matches!(self.status_code(), Some(400 | 401 | 403))
    }
}

/// Error document returned by the service on non-2xx responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: None,
            code: Some(code.into()),
            message: Some(message.into()),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.details.push(detail);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<InnerError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_minimum_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_maximum_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_values: Option<Vec<String>>,
}
