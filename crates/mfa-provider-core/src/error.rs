//! Provider error types

use thiserror::Error;

/// Errors raised by the reconciliation engine outside of an API call.
///
/// Failures that belong to a single host operation are reported as
/// [`Diagnostics`](crate::diag::Diagnostics) instead.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Resource type not found: {0}")]
    ResourceTypeNotFound(String),

    #[error("Data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State error: {0}")]
    StateError(String),

    #[error("Missing state upgrader for schema version {version} of {resource_type}")]
    MissingUpgrader { resource_type: String, version: u64 },

    #[error("State schema version {found} of {resource_type} is newer than supported version {supported}")]
    UnsupportedStateVersion {
        resource_type: String,
        found: u64,
        supported: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
