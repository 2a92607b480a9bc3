//! MFA Provider Client
//!
//! Typed REST client for the identity service MFA API: device authentication
//! policies, FIDO policies, application push credentials and environment MFA
//! settings. Every response comes back as an [`mfa_provider_core::ApiResult`]
//! so the provider's response pipeline can classify failures.

pub mod api;
pub mod error;
pub mod http;
pub mod models;

// Re-exports
pub use api::MfaApi;
pub use error::{ClientError, Result};
pub use http::{ClientConfig, DEFAULT_API_URL_TEMPLATE, DEFAULT_REGION_SUFFIX, HttpMfaClient};
