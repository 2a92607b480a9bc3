//! The MFA API surface the provider depends on

use crate::models::{
    Application, DeviceAuthenticationPolicy, Environment, Fido2Policy, FidoPolicy, MfaSettings,
    MigrateRequest, PushCredential, PushCredentialRequest,
};
use async_trait::async_trait;
use mfa_provider_core::{ApiResult, Page, RequestContext};

/// Typed operations per resource family.
///
/// Every call is scoped by an environment ID; the region suffix comes from
/// the request context. Implementations are shared across tasks through `Arc`.
#[async_trait]
pub trait MfaApi: Send + Sync {
    // Environment and applications
    async fn read_environment(&self, ctx: &RequestContext, environment_id: &str)
    -> ApiResult<Environment>;

    async fn read_application(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
    ) -> ApiResult<Application>;

    // Device authentication policies
    async fn create_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy>;

    async fn read_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<DeviceAuthenticationPolicy>;

    async fn update_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy>;

    async fn delete_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()>;

    /// One page of the policy list. `cursor` is the previous page's `next` link.
    async fn list_device_policies(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        cursor: Option<String>,
    ) -> ApiResult<Page<DeviceAuthenticationPolicy>>;

    async fn migrate_device_policies(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        request: &MigrateRequest,
    ) -> ApiResult<()>;

    // FIDO policies
    async fn create_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy>;

    async fn read_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<FidoPolicy>;

    async fn update_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy>;

    async fn delete_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()>;

    // FIDO2 policies
    async fn create_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy>;

    async fn read_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<Fido2Policy>;

    async fn update_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy>;

    async fn delete_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()>;

    // Application push credentials
    async fn create_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential>;

    async fn read_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
    ) -> ApiResult<PushCredential>;

    async fn update_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
        request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential>;

    async fn delete_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
    ) -> ApiResult<()>;

    // Environment MFA settings
    async fn read_mfa_settings(&self, ctx: &RequestContext, environment_id: &str)
    -> ApiResult<MfaSettings>;

    async fn update_mfa_settings(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        settings: &MfaSettings,
    ) -> ApiResult<MfaSettings>;

    /// Restore the service defaults
    async fn reset_mfa_settings(&self, ctx: &RequestContext, environment_id: &str) -> ApiResult<()>;
}
