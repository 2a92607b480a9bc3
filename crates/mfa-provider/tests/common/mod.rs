//! In-memory stand-in for the MFA API
//!
//! Objects live in maps keyed by ID. Calls scoped to an unknown environment
//! answer 403, the way the service does once an environment is deleted, and
//! `read_environment` answers 404 for it.

#![allow(dead_code)]

use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{
    Application, ApplicationMobile, DeviceAuthenticationPolicy, Environment, Fido2Policy,
    FidoPolicy, MfaSettings, MigrateRequest, ObjectRef, Pairing, PushCredential,
    PushCredentialRequest,
};
use mfa_provider_core::{
    ApiError, ApiResponse, ApiResult, ErrorBody, Page, RequestContext, RetryConfig,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const ENV_ID: &str = "8d1c4b5e-3b7a-4c7a-9d51-6c7b2f1f1a01";
pub const GONE_ENV_ID: &str = "0b6f3a52-95c4-4d19-8a8e-3e0f2b7c9d44";
pub const APP_ID: &str = "2f0c8c39-8e5f-4d0e-a4a2-6a0e5a9d4c11";

/// One recorded API call
#[derive(Debug, Clone)]
pub struct Call {
    pub operation: &'static str,
    pub environment_id: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct FakeState {
    pub environments: HashSet<String>,
    pub applications: HashMap<String, Application>,
    pub device_policies: BTreeMap<String, DeviceAuthenticationPolicy>,
    pub fido_policies: BTreeMap<String, FidoPolicy>,
    pub fido2_policies: BTreeMap<String, Fido2Policy>,
    /// Credential ID to (application ID, credential)
    pub push_credentials: BTreeMap<String, (String, PushCredential)>,
    pub mfa_settings: HashMap<String, MfaSettings>,
    pub migrations: Vec<MigrateRequest>,
    /// Policies per list page
    pub page_size: usize,
    /// IDs handed out to created objects before falling back to a counter
    pub next_ids: VecDeque<String>,
    /// Outcomes queued for the next calls of an operation: `Some` fails the
    /// call, `None` lets it through
    pub failures: HashMap<&'static str, VecDeque<Option<ApiError>>>,
    pub calls: Vec<Call>,
    counter: u32,
}

pub struct FakeMfaApi {
    state: Mutex<FakeState>,
}

impl FakeMfaApi {
    pub fn new() -> Arc<Self> {
        let mut state = FakeState {
            page_size: 100,
            ..FakeState::default()
        };
        state.environments.insert(ENV_ID.to_string());
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn next_id(&self, id: &str) {
        self.state().next_ids.push_back(id.to_string());
    }

    pub fn fail_next(&self, operation: &'static str, error: ApiError) {
        self.state()
            .failures
            .entry(operation)
            .or_default()
            .push_back(Some(error));
    }

    /// Let the next call of `operation` through before any queued failure
    pub fn pass_next(&self, operation: &'static str) {
        self.state()
            .failures
            .entry(operation)
            .or_default()
            .push_back(None);
    }

    pub fn add_application(&self, application: Application) {
        self.state()
            .applications
            .insert(application.id.clone(), application);
    }

    pub fn add_device_policy(&self, id: &str, name: &str) {
        let policy: DeviceAuthenticationPolicy =
            serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap();
        self.state().device_policies.insert(id.to_string(), policy);
    }

    pub fn calls(&self, operation: &str) -> Vec<Call> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    /// Operations called, in order
    pub fn operations(&self) -> Vec<&'static str> {
        self.state().calls.iter().map(|call| call.operation).collect()
    }

    /// Record the call, then fail it when an error is queued or the
    /// environment is unknown.
    fn begin(
        &self,
        operation: &'static str,
        environment_id: &str,
        body: Option<Value>,
    ) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call {
            operation,
            environment_id: environment_id.to_string(),
            body,
        });

        if let Some(Some(error)) = state
            .failures
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        if !state.environments.contains(environment_id) {
            return Err(forbidden());
        }
        Ok(state)
    }

    fn begin_with<B: Serialize>(
        &self,
        operation: &'static str,
        environment_id: &str,
        body: &B,
    ) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let body = serde_json::to_value(body).ok();
        self.begin(operation, environment_id, body)
    }
}

impl FakeState {
    fn new_id(&mut self, prefix: &str) -> String {
        if let Some(id) = self.next_ids.pop_front() {
            return id;
        }
        self.counter += 1;
        format!("{}-{}", prefix, self.counter)
    }
}

fn ok<T>(value: T) -> ApiResult<T> {
    Ok(ApiResponse::new(200, value))
}

pub fn not_found() -> ApiError {
    ApiError::status(
        404,
        Some(ErrorBody::new(
            "NOT_FOUND",
            "The request could not be completed. The requested resource was not found.",
        )),
    )
}

pub fn forbidden() -> ApiError {
    ApiError::status(
        403,
        Some(ErrorBody::new(
            "ACCESS_FAILED",
            "The request could not be completed. You do not have access to this resource.",
        )),
    )
}

/// Context with short backoff so retry tests finish quickly
pub fn ctx() -> RequestContext {
    RequestContext::new().with_retry(RetryConfig {
        max_attempts: 5,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        backoff_multiplier: 2.0,
        timeout: Duration::from_secs(5),
    })
}

pub fn native_application(id: &str) -> Application {
    Application {
        id: id.to_string(),
        name: Some("Authenticator".to_string()),
        protocol: "OPENID_CONNECT".to_string(),
        application_type: "NATIVE_APP".to_string(),
        mobile: Some(ApplicationMobile {
            bundle_id: Some("com.example.authenticator".to_string()),
            package_name: None,
            integrity_detection: None,
        }),
    }
}

fn default_settings(environment_id: &str) -> MfaSettings {
    MfaSettings {
        pairing: Pairing {
            max_allowed_devices: 5,
            pairing_key_format: "NUMERIC".to_string(),
        },
        lockout: None,
        phone_extensions: None,
        users: None,
        environment: Some(ObjectRef {
            id: environment_id.to_string(),
        }),
        updated_at: None,
    }
}

#[async_trait]
impl MfaApi for FakeMfaApi {
    async fn read_environment(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
    ) -> ApiResult<Environment> {
        let mut state = self.state();
        state.calls.push(Call {
            operation: "read_environment",
            environment_id: environment_id.to_string(),
            body: None,
        });
        if !state.environments.contains(environment_id) {
            return Err(not_found());
        }
        ok(Environment {
            id: environment_id.to_string(),
            name: Some("Test".to_string()),
        })
    }

    async fn read_application(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
    ) -> ApiResult<Application> {
        let state = self.begin("read_application", environment_id, None)?;
        match state.applications.get(application_id) {
            Some(application) => ok(application.clone()),
            None => Err(not_found()),
        }
    }

    async fn create_device_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        let mut state = self.begin_with("create_device_policy", environment_id, policy)?;
        let id = state.new_id("pol");
        let mut created = policy.clone();
        created.id = Some(id.clone());
        state.device_policies.insert(id, created.clone());
        ok(created)
    }

    async fn read_device_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        let state = self.begin("read_device_policy", environment_id, None)?;
        match state.device_policies.get(policy_id) {
            Some(policy) => ok(policy.clone()),
            None => Err(not_found()),
        }
    }

    async fn update_device_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &DeviceAuthenticationPolicy,
    ) -> ApiResult<DeviceAuthenticationPolicy> {
        let mut state = self.begin_with("update_device_policy", environment_id, policy)?;
        if !state.device_policies.contains_key(policy_id) {
            return Err(not_found());
        }
        let mut updated = policy.clone();
        updated.id = Some(policy_id.to_string());
        state
            .device_policies
            .insert(policy_id.to_string(), updated.clone());
        ok(updated)
    }

    async fn delete_device_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()> {
        let mut state = self.begin("delete_device_policy", environment_id, None)?;
        match state.device_policies.remove(policy_id) {
            Some(_) => Ok(ApiResponse::new(204, ())),
            None => Err(not_found()),
        }
    }

    async fn list_device_policies(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        cursor: Option<String>,
    ) -> ApiResult<Page<DeviceAuthenticationPolicy>> {
        let body = cursor.clone().map(Value::String);
        let state = self.begin("list_device_policies", environment_id, body)?;
        let start = cursor
            .as_deref()
            .and_then(|cursor| cursor.strip_prefix("offset="))
            .and_then(|offset| offset.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (start + state.page_size).min(state.device_policies.len());

        let items: Vec<_> = state
            .device_policies
            .values()
            .skip(start)
            .take(end - start)
            .cloned()
            .collect();
        let next = (end < state.device_policies.len()).then(|| format!("offset={}", end));
        ok(Page { items, next })
    }

    async fn migrate_device_policies(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        request: &MigrateRequest,
    ) -> ApiResult<()> {
        let mut state = self.begin_with("migrate_device_policies", environment_id, request)?;
        state.migrations.push(request.clone());
        ok(())
    }

    async fn create_fido_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy> {
        let mut state = self.begin_with("create_fido_policy", environment_id, policy)?;
        let id = state.new_id("fido");
        let mut created = policy.clone();
        created.id = Some(id.clone());
        created.default = Some(false);
        state.fido_policies.insert(id, created.clone());
        ok(created)
    }

    async fn read_fido_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<FidoPolicy> {
        let state = self.begin("read_fido_policy", environment_id, None)?;
        match state.fido_policies.get(policy_id) {
            Some(policy) => ok(policy.clone()),
            None => Err(not_found()),
        }
    }

    async fn update_fido_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &FidoPolicy,
    ) -> ApiResult<FidoPolicy> {
        let mut state = self.begin_with("update_fido_policy", environment_id, policy)?;
        if !state.fido_policies.contains_key(policy_id) {
            return Err(not_found());
        }
        let mut updated = policy.clone();
        updated.id = Some(policy_id.to_string());
        updated.default = Some(false);
        state
            .fido_policies
            .insert(policy_id.to_string(), updated.clone());
        ok(updated)
    }

    async fn delete_fido_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()> {
        let mut state = self.begin("delete_fido_policy", environment_id, None)?;
        match state.fido_policies.remove(policy_id) {
            Some(_) => Ok(ApiResponse::new(204, ())),
            None => Err(not_found()),
        }
    }

    async fn create_fido2_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy> {
        let mut state = self.begin_with("create_fido2_policy", environment_id, policy)?;
        let id = state.new_id("fido2");
        let mut created = policy.clone();
        created.id = Some(id.clone());
        created.environment = Some(ObjectRef {
            id: environment_id.to_string(),
        });
        state.fido2_policies.insert(id, created.clone());
        ok(created)
    }

    async fn read_fido2_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<Fido2Policy> {
        let state = self.begin("read_fido2_policy", environment_id, None)?;
        match state.fido2_policies.get(policy_id) {
            Some(policy) => ok(policy.clone()),
            None => Err(not_found()),
        }
    }

    async fn update_fido2_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
        policy: &Fido2Policy,
    ) -> ApiResult<Fido2Policy> {
        let mut state = self.begin_with("update_fido2_policy", environment_id, policy)?;
        if !state.fido2_policies.contains_key(policy_id) {
            return Err(not_found());
        }
        let mut updated = policy.clone();
        updated.id = Some(policy_id.to_string());
        updated.environment = Some(ObjectRef {
            id: environment_id.to_string(),
        });
        state
            .fido2_policies
            .insert(policy_id.to_string(), updated.clone());
        ok(updated)
    }

    async fn delete_fido2_policy(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        policy_id: &str,
    ) -> ApiResult<()> {
        let mut state = self.begin("delete_fido2_policy", environment_id, None)?;
        match state.fido2_policies.remove(policy_id) {
            Some(_) => Ok(ApiResponse::new(204, ())),
            None => Err(not_found()),
        }
    }

    async fn create_push_credential(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential> {
        let mut state = self.begin_with("create_push_credential", environment_id, request)?;
        let id = state.new_id("cred");
        let credential = PushCredential {
            id: id.clone(),
            credential_type: request.credential_type(),
            created_at: None,
            updated_at: None,
        };
        state
            .push_credentials
            .insert(id, (application_id.to_string(), credential.clone()));
        ok(credential)
    }

    async fn read_push_credential(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
    ) -> ApiResult<PushCredential> {
        let state = self.begin("read_push_credential", environment_id, None)?;
        match state.push_credentials.get(credential_id) {
            Some((owner, credential)) if owner.as_str() == application_id => ok(credential.clone()),
            _ => Err(not_found()),
        }
    }

    async fn update_push_credential(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
        request: &PushCredentialRequest,
    ) -> ApiResult<PushCredential> {
        let mut state = self.begin_with("update_push_credential", environment_id, request)?;
        let Some((owner, credential)) = state.push_credentials.get_mut(credential_id) else {
            return Err(not_found());
        };
        if owner.as_str() != application_id {
            return Err(not_found());
        }
        credential.credential_type = request.credential_type();
        ok(credential.clone())
    }

    async fn delete_push_credential(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
    ) -> ApiResult<()> {
        let mut state = self.begin("delete_push_credential", environment_id, None)?;
        let owned = matches!(
            state.push_credentials.get(credential_id),
            Some((owner, _)) if owner.as_str() == application_id
        );
        if !owned {
            return Err(not_found());
        }
        state.push_credentials.remove(credential_id);
        Ok(ApiResponse::new(204, ()))
    }

    async fn read_mfa_settings(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
    ) -> ApiResult<MfaSettings> {
        let state = self.begin("read_mfa_settings", environment_id, None)?;
        let settings = state
            .mfa_settings
            .get(environment_id)
            .cloned()
            .unwrap_or_else(|| default_settings(environment_id));
        ok(settings)
    }

    async fn update_mfa_settings(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
        settings: &MfaSettings,
    ) -> ApiResult<MfaSettings> {
        let mut state = self.begin_with("update_mfa_settings", environment_id, settings)?;
        let mut stored = settings.clone();
        stored.environment = Some(ObjectRef {
            id: environment_id.to_string(),
        });
        state
            .mfa_settings
            .insert(environment_id.to_string(), stored.clone());
        ok(stored)
    }

    async fn reset_mfa_settings(
        &self,
        _ctx: &RequestContext,
        environment_id: &str,
    ) -> ApiResult<()> {
        let mut state = self.begin("reset_mfa_settings", environment_id, None)?;
        state.mfa_settings.remove(environment_id);
        Ok(ApiResponse::new(204, ()))
    }
}
