//! reqwest-backed implementation of [`MfaApi`]
//!
//! Bearer token authentication; the base URL is built per call from the
//! configured template and the request context's region suffix.

use crate::api::MfaApi;
use crate::error::{ClientError, Result};
use crate::models::{
    Application, DeviceAuthenticationPolicy, EntityArray, Environment, Fido2Policy, FidoPolicy,
    MIGRATE_CONTENT_TYPE, MfaSettings, MigrateRequest, PushCredential, PushCredentialRequest,
};
use async_trait::async_trait;
use mfa_provider_core::{ApiError, ApiResponse, ApiResult, ErrorBody, Page, RequestContext};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL_TEMPLATE: &str = "https://api.pingone.{suffix}/v1";
pub const DEFAULT_REGION_SUFFIX: &str = "com";

const DEVICE_POLICIES: &str = "deviceAuthenticationPolicies";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL; `{suffix}` is replaced with the region suffix
    pub api_url_template: String,

    pub api_token: String,

    /// Region suffix used when the request context carries none
    pub default_region_suffix: String,

    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_url_template: DEFAULT_API_URL_TEMPLATE.to_string(),
            api_token: api_token.into(),
            default_region_suffix: DEFAULT_REGION_SUFFIX.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_url_template(mut self, template: impl Into<String>) -> Self {
        self.api_url_template = template.into();
        self
    }

    pub fn with_region_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.default_region_suffix = suffix.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// MFA API client over HTTPS
pub struct HttpMfaClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpMfaClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(ClientError::MissingToken);
        }
        if !config.api_url_template.starts_with("http://")
            && !config.api_url_template.starts_with("https://")
        {
            return Err(ClientError::InvalidUrlTemplate(config.api_url_template));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Base URL for the region the context targets
    pub fn base_url(&self, ctx: &RequestContext) -> String {
        let suffix = ctx
            .region_suffix()
            .unwrap_or(self.config.default_region_suffix.as_str());
        self.config
            .api_url_template
            .replace("{suffix}", suffix)
            .trim_end_matches('/')
            .to_string()
    }

    fn environment_url(&self, ctx: &RequestContext, environment_id: &str, path: &str) -> String {
        let base = format!("{}/environments/{}", self.base_url(ctx), environment_id);
        if path.is_empty() {
            base
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "API request");
        self.client
            .request(method, url)
            .bearer_auth(&self.config.api_token)
    }

    async fn execute(&self, ctx: &RequestContext, request: RequestBuilder) -> ApiResult<Response> {
        let response = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => return Err(ApiError::Cancelled),
            result = request.send() => result.map_err(|e| ApiError::Transport(e.to_string()))?,
        };

        let status = response.status().as_u16();
        if response.status().is_success() {
            Ok(ApiResponse::new(status, response))
        } else {
            Err(status_error(response).await)
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.execute(ctx, request).await?;
        let status = response.status;
        let value = response
            .value
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(ApiResponse::new(status, value))
    }

    async fn fetch_empty(&self, ctx: &RequestContext, request: RequestBuilder) -> ApiResult<()> {
        let response = self.execute(ctx, request).await?;
        Ok(response.map(|_| ()))
    }

    async fn get<T: DeserializeOwned>(&self, ctx: &RequestContext, url: &str) -> ApiResult<T> {
        self.fetch(ctx, self.request(Method::GET, url)).await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.fetch(ctx, self.request(method, url).json(body)).await
    }

    async fn delete(&self, ctx: &RequestContext, url: &str) -> ApiResult<()> {
        self.fetch_empty(ctx, self.request(Method::DELETE, url)).await
    }
}

/// Turn a non-2xx response into an [`ApiError`], keeping the service error
/// document when it parses
async fn status_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let body = match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text).ok(),
        Err(_) => None,
    };

    ApiError::Status {
        status,
        body,
        retry_after,
    }
}

#[async_trait]
impl MfaApi for HttpMfaClient {
    async fn read_environment(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
    ) -> ApiResult<Environment> {
        self.get(ctx, &self.environment_url(ctx, environment_id, ""))
            .await
    }

    async fn read_application(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
    ) -> ApiResult<Application> {
        let path = format!("applications/{}", application_id);
        self.get(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn create_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        let url = self.environment_url(ctx, environment_id, DEVICE_POLICIES);
        self.send_json(ctx, Method::POST, &url, policy).await
    }

    async fn read_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        let path = format!("{}/{}", DEVICE_POLICIES, policy_id);
        self.get(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn update_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        let path = format!("{}/{}", DEVICE_POLICIES, policy_id);
        let url = self.environment_url(ctx, environment_id, &path);
        self.send_json(ctx, Method::PUT, &url, policy).await
    }

    async fn delete_device_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()> {
        let path = format!("{}/{}", DEVICE_POLICIES, policy_id);
        self.delete(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn list_device_policies(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        cursor: Option<String>,
    ) -> ApiResult<Page<DeviceAuthenticationPolicy>> {
        let url = match cursor {
            Some(next) => next,
            None => self.environment_url(ctx, environment_id, DEVICE_POLICIES),
        };

        let response = self
            .get::<EntityArray<DeviceAuthenticationPolicy>>(ctx, &url)
            .await?;
        Ok(response.map(|mut array| Page {
            next: array.next_href(),
            items: array.take(DEVICE_POLICIES),
        }))
    }

    async fn migrate_device_policies(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        request: &MigrateRequest,
    ) -> ApiResult<()> {
        let url = self.environment_url(ctx, environment_id, DEVICE_POLICIES);
        let body = serde_json::to_vec(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let request = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, MIGRATE_CONTENT_TYPE)
            .body(body);
        self.fetch_empty(ctx, request).await
    }

    async fn create_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy> {
        let url = self.environment_url(ctx, environment_id, "fidoPolicies");
        self.send_json(ctx, Method::POST, &url, policy).await
    }

    async fn read_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<FidoPolicy> {
        let path = format!("fidoPolicies/{}", policy_id);
        self.get(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn update_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy> {
        let path = format!("fidoPolicies/{}", policy_id);
        let url = self.environment_url(ctx, environment_id, &path);
        self.send_json(ctx, Method::PUT, &url, policy).await
    }

    async fn delete_fido_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()> {
        let path = format!("fidoPolicies/{}", policy_id);
        self.delete(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn create_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy> {
        let url = self.environment_url(ctx, environment_id, "fido2Policies");
        self.send_json(ctx, Method::POST, &url, policy).await
    }

    async fn read_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<Fido2Policy> {
        let path = format!("fido2Policies/{}", policy_id);
        self.get(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn update_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy> {
        let path = format!("fido2Policies/{}", policy_id);
        let url = self.environment_url(ctx, environment_id, &path);
        self.send_json(ctx, Method::PUT, &url, policy).await
    }

    async fn delete_fido2_policy(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()> {
        let path = format!("fido2Policies/{}", policy_id);
        self.delete(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn create_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential> {
        let path = format!("applications/{}/pushCredentials", application_id);
        let url = self.environment_url(ctx, environment_id, &path);
        self.send_json(ctx, Method::POST, &url, request).await
    }

    async fn read_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
    ) -> ApiResult<PushCredential> {
        let path = format!(
            "applications/{}/pushCredentials/{}",
            application_id, credential_id
        );
        self.get(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn update_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
        request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential> {
        let path = format!(
            "applications/{}/pushCredentials/{}",
            application_id, credential_id
        );
        let url = self.environment_url(ctx, environment_id, &path);
        self.send_json(ctx, Method::PUT, &url, request).await
    }

    async fn delete_push_credential(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
    ) -> ApiResult<()> {
        let path = format!(
            "applications/{}/pushCredentials/{}",
            application_id, credential_id
        );
        self.delete(ctx, &self.environment_url(ctx, environment_id, &path))
            .await
    }

    async fn read_mfa_settings(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
    ) -> ApiResult<MfaSettings> {
        self.get(ctx, &self.environment_url(ctx, environment_id, "mfaSettings"))
            .await
    }

    async fn update_mfa_settings(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
        settings: &MfaSettings,
    ) -> ApiResult<MfaSettings> {
        let url = self.environment_url(ctx, environment_id, "mfaSettings");
        self.send_json(ctx, Method::PUT, &url, settings).await
    }

    async fn reset_mfa_settings(&self, ctx: &RequestContext, environment_id: &str) -> ApiResult<()> {
        self.delete(ctx, &self.environment_url(ctx, environment_id, "mfaSettings"))
            .await
    }
}
