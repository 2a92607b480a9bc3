//! API を呼ばないコマンド用の `MfaApi`
//!
//! resources / schema / validate / plan / upgrade-state はスキーマと状態だけで
//! 完結するため、トークン無しでもプロバイダーを組み立てられるようにする。

use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{
    Application, DeviceAuthenticationPolicy, Environment, Fido2Policy, FidoPolicy, MfaSettings,
    MigrateRequest, PushCredential, PushCredentialRequest,
};
use mfa_provider_core::{ApiError, ApiResult, Page, RequestContext};

/// どの呼び出しも接続エラーを返す
pub struct OfflineApi;

fn unavailable() -> ApiError {
    ApiError::Transport("このコマンドは API に接続しません".to_string())
}

#[async_trait]
impl MfaApi for OfflineApi {
    async fn read_environment(&self, _ctx: &RequestContext, _environment_id: &str)
    -> ApiResult<Environment> {
        Err(unavailable())
    }

    async fn read_application(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _application_id: &str,
    ) -> ApiResult<Application> {
        Err(unavailable())
    }

    async fn create_device_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        Err(unavailable())
    }

    async fn read_device_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        Err(unavailable())
    }

    async fn update_device_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
        _policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        Err(unavailable())
    }

    async fn delete_device_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
    ) -> ApiResult<()> {
        Err(unavailable())
    }

    async fn list_device_policies(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _cursor: Option<String>,
    ) -> ApiResult<Page<DeviceAuthenticationPolicy>> {
        Err(unavailable())
    }

    async fn migrate_device_policies(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _request: &MigrateRequest,
    ) -> ApiResult<()> {
        Err(unavailable())
    }

    async fn create_fido_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy> {
        Err(unavailable())
    }

    async fn read_fido_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
    ) -> ApiResult<FidoPolicy> {
        Err(unavailable())
    }

    async fn update_fido_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
        _policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy> {
        Err(unavailable())
    }

    async fn delete_fido_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
    ) -> ApiResult<()> {
        Err(unavailable())
    }

    async fn create_fido2_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy> {
        Err(unavailable())
    }

    async fn read_fido2_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
    ) -> ApiResult<Fido2Policy> {
        Err(unavailable())
    }

    async fn update_fido2_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
        _policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy> {
        Err(unavailable())
    }

    async fn delete_fido2_policy(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _policy_id: &str,
    ) -> ApiResult<()> {
        Err(unavailable())
    }

    async fn create_push_credential(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _application_id: &str,
        _request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential> {
        Err(unavailable())
    }

    async fn read_push_credential(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _application_id: &str,
        _credential_id: &str,
    ) -> ApiResult<PushCredential> {
        Err(unavailable())
    }

    async fn update_push_credential(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _application_id: &str,
        _credential_id: &str,
        _request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential> {
        Err(unavailable())
    }

    async fn delete_push_credential(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _application_id: &str,
        _credential_id: &str,
    ) -> ApiResult<()> {
        Err(unavailable())
    }

    async fn read_mfa_settings(&self, _ctx: &RequestContext, _environment_id: &str)
    -> ApiResult<MfaSettings> {
        Err(unavailable())
    }

    async fn update_mfa_settings(
        &self,
        _ctx: &RequestContext,
        _environment_id: &str,
        _settings: &MfaSettings,
    ) -> ApiResult<MfaSettings> {
        Err(unavailable())
    }

    async fn reset_mfa_settings(&self, _ctx: &RequestContext, _environment_id: &str) -> ApiResult<()> {
        Err(unavailable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_fails_without_retry() {
        let api = OfflineApi;
        let ctx = RequestContext::new();

        let err = api.read_environment(&ctx, "env").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(api.list_device_policies(&ctx, "env", None).await.is_err());
    }
}
