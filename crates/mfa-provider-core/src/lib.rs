//! MFA Provider Core
//!
//! Plugin-side framework shared by every MFA resource and data source:
//! schemas, diagnostics, the API response pipeline, state upgrades and the
//! plan/apply lifecycle the host drives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 IaC host / CLI                   │
//! │        (plan, apply, refresh, import)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               mfa-provider-core                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait Resource / trait DataSource        │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Schema/Diff  │  │ State Upgrade│            │
//! │  └──────────────┘  └──────────────┘            │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Pipeline: retry, error mapping, paging   │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │        mfa-provider-client (REST API)            │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod api;
pub mod context;
pub mod diag;
pub mod error;
pub mod import;
pub mod json;
pub mod lifecycle;
pub mod paginate;
pub mod pipeline;
pub mod resource;
pub mod retry;
pub mod schema;
pub mod state;
pub mod upgrade;

// Re-exports
pub use action::{Action, ActionType, AttributeChange, Plan, PlanSummary};
pub use api::{ApiError, ApiResponse, ApiResult, ErrorBody, ErrorDetail, InnerError};
pub use context::RequestContext;
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::{ProviderError, Result};
pub use json::NormalizedJson;
pub use lifecycle::PlannedChange;
pub use paginate::{Page, paginate};
pub use pipeline::{
    ErrorMapper, call_with_retry, check_environment_exists_on_permissions_error,
    format_api_error, invoke,
};
pub use resource::{DataSource, Outcome, Resource};
pub use retry::{RetryConfig, Retryable, default_create_read_retryable, default_retryable};
pub use schema::{
    Attribute, AttributeType, Block, DUMMY_SUPPRESS_VALUE, Presence, ReplaceWhen, Schema,
    Validator,
};
pub use state::ResourceState;
pub use upgrade::{StateUpgrader, check_upgraders, upgrade_state};
