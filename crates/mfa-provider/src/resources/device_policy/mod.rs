//! `mfa_policy`: MFA device authentication policies
//!
//! Every write sends the complete policy. Mobile applications referenced by
//! the policy are checked against the applications API before the write.

mod expand;
mod flatten;
mod mobile;
mod schema;

pub(crate) use expand::expand;
pub(crate) use flatten::flatten;

use crate::scoped;
use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_core::resource::get_str;
use mfa_provider_core::{
    ApiError, Diagnostic, Diagnostics, ErrorMapper, Outcome, RequestContext, Resource, Schema,
    default_create_read_retryable, default_retryable,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const TYPE_NAME: &str = "mfa_policy";

/// Upper bound on a delete, conflict retries included
const DELETE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DevicePolicyResource {
    api: Arc<dyn MfaApi>,
}

impl DevicePolicyResource {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self { api }
    }

    async fn read_by_id(&self, ctx: &RequestContext, environment_id: &str, id: &str) -> Outcome {
        let api = self.api.as_ref();
        let (policy, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "ReadOneDeviceAuthenticationPolicy",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_create_read_retryable),
            move || api.read_device_policy(ctx, environment_id, id),
        )
        .await;

        if diags.has_error() {
            return Outcome::failed(diags);
        }
        match policy {
            Some(policy) => {
                Outcome::with_diagnostics(Some(flatten(environment_id, id, &policy)), diags)
            }
            None => Outcome::removed(diags),
        }
    }
}

/// Environments upgraded to FIDO2 policies reject the legacy device types.
pub(crate) fn deprecated_fido_settings(error: &ApiError) -> Option<Diagnostics> {
    let message = error.first_detail()?.message.as_deref()?;
    message.starts_with("Deprecated Fido Settings").then(|| {
        Diagnostic::error(
            "Invalid FIDO device types.",
            "The `security_key` and `platform` parameters are deprecated and cannot be configured for new environments or environments that have been upgraded to use the latest FIDO2 policies.  Use the `fido2` parameter instead.",
        )
        .into()
    })
}

/// Transient failures, plus the conflict raised while a sign-on policy still
/// references the policy being deleted.
pub(crate) fn delete_retryable(error: &ApiError) -> bool {
    if default_retryable(error) {
        return true;
    }

    let referenced = error.status_code() == Some(409)
        && error.first_detail().is_some_and(|detail| {
            detail.code.as_deref() == Some("INVALID_VALUE")
                && detail.target.as_deref() == Some("signOnPolicies")
        });
    if referenced {
        warn!("Conflict detected when deleting MFA policy.  This is likely due to the policy being referenced by a sign-on policy.  Retrying..");
    }
    referenced
}

fn missing(attribute: &str) -> Outcome {
    Outcome::failed(Diagnostic::internal(format!(
        "The `{}` attribute is not set on the MFA policy.",
        attribute
    )))
}

#[async_trait]
impl Resource for DevicePolicyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema::schema()
    }

    fn import_format(&self) -> Option<&'static str> {
        Some("environmentID/mfaPolicyID")
    }

    fn import_attributes(&self, components: &[String]) -> Value {
        json!({ "environment_id": components.first(), "id": components.get(1) })
    }

    async fn create(&self, ctx: &RequestContext, plan: &Value) -> Outcome {
        let api = self.api.as_ref();
        let Some(environment_id) = get_str(plan, "environment_id") else {
            return missing("environment_id");
        };

        let mut diags = mobile::check_mobile_applications(api, ctx, environment_id, plan).await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        let request = match expand(plan) {
            Ok(request) => request,
            Err(expand_diags) => return Outcome::failed(expand_diags).after(diags),
        };
        let request = &request;

        let (created, create_diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "CreateDeviceAuthenticationPolicies",
            ErrorMapper::Custom(deprecated_fido_settings),
            Some(default_create_read_retryable),
            move || api.create_device_policy(ctx, environment_id, request),
        )
        .await;
        diags.append(create_diags);
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        let Some(id) = created.and_then(|policy| policy.id) else {
            diags.push(Diagnostic::internal(
                "The service did not return an ID for the created MFA policy.",
            ));
            return Outcome::failed(diags);
        };

        info!(environment_id, id = %id, "MFA policy created");
        self.read_by_id(ctx, environment_id, &id).await.after(diags)
    }

    async fn read(&self, ctx: &RequestContext, state: &Value) -> Outcome {
        let (Some(environment_id), Some(id)) = (get_str(state, "environment_id"), get_str(state, "id"))
        else {
            return missing("id");
        };
        self.read_by_id(ctx, environment_id, id).await
    }

    async fn update(&self, ctx: &RequestContext, plan: &Value, prior: &Value) -> Outcome {
        let api = self.api.as_ref();
        let Some(environment_id) = get_str(plan, "environment_id") else {
            return missing("environment_id");
        };
        let Some(id) = get_str(prior, "id") else {
            return missing("id");
        };

        let mut diags = mobile::check_mobile_applications(api, ctx, environment_id, plan).await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        let request = match expand(plan) {
            Ok(request) => request,
            Err(expand_diags) => return Outcome::failed(expand_diags).after(diags),
        };
        let request = &request;

        let (_, update_diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "UpdateMFAPolicy",
            ErrorMapper::Custom(deprecated_fido_settings),
            Some(default_retryable),
            move || api.update_device_policy(ctx, environment_id, id, request),
        )
        .await;
        diags.append(update_diags);
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        info!(environment_id, id, "MFA policy updated");
        self.read_by_id(ctx, environment_id, id).await.after(diags)
    }

    async fn delete(&self, ctx: &RequestContext, state: &Value) -> Diagnostics {
        let api = self.api.as_ref();
        let (Some(environment_id), Some(id)) = (get_str(state, "environment_id"), get_str(state, "id"))
        else {
            return missing("id").diagnostics;
        };

        let ctx = &ctx.with_timeout(DELETE_TIMEOUT);
        let (_, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "DeleteDeviceAuthenticationPolicy",
            ErrorMapper::ResourceNotFoundWarning,
            Some(delete_retryable),
            move || api.delete_device_policy(ctx, environment_id, id),
        )
        .await;
        diags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfa_provider_core::{ErrorBody, ErrorDetail};

    fn detail(code: &str, target: &str, message: &str) -> ErrorDetail {
        ErrorDetail {
            code: Some(code.into()),
            target: Some(target.into()),
            message: Some(message.into()),
            inner_error: None,
        }
    }

    fn planned(config: Value) -> Value {
        schema::schema().apply_defaults(&config)
    }

    fn full_config() -> Value {
        json!({
            "environment_id": "8d1c4b5e-3b7a-4c7a-9d51-6c7b2f1f1a01",
            "name": "Default MFA",
            "sms": { "enabled": true },
            "voice": { "enabled": false, "otp_lifetime_duration": 5 },
            "email": { "enabled": true, "otp_failure_cooldown_duration": 3, "otp_failure_cooldown_timeunit": "SECONDS" },
            "mobile": {
                "enabled": true,
                "application": [{
                    "id": "2f0c8c39-8e5f-4d0e-a4a2-6a0e5a9d4c11",
                    "push_enabled": true,
                    "otp_enabled": true,
                    "push_timeout_duration": 100,
                    "device_authorization_enabled": true,
                    "device_authorization_extra_verification": "restrictive",
                    "integrity_detection": "permissive"
                }]
            },
            "totp": { "enabled": true },
            "fido2": { "enabled": true }
        })
    }

    #[test]
    fn test_schema_accepts_full_config() {
        let diags = schema::schema().validate_config(&full_config());
        assert!(!diags.has_error(), "{:?}", diags);
    }

    #[test]
    fn test_fido2_conflicts_with_legacy_types() {
        let mut config = full_config();
        config["security_key"] = json!({ "enabled": true });
        let diags = schema::schema().validate_config(&config);
        assert!(diags.has_error());
        assert!(diags.warnings().any(|d| d.summary == "Argument is deprecated"));
    }

    #[test]
    fn test_expand_sends_push_timeout_in_seconds() {
        let policy = expand(&planned(full_config())).unwrap();
        let apps = policy.mobile.unwrap().applications.unwrap();
        let timeout = apps[0].push_timeout.as_ref().unwrap();
        assert_eq!(timeout.duration, 100);
        assert_eq!(timeout.time_unit, expand::PUSH_TIMEOUT_UNIT);
        assert!(!policy.for_sign_on_policy);
    }

    #[test]
    fn test_expand_flatten_round_trip() {
        let plan = planned(full_config());
        let mut policy = expand(&plan).unwrap();
        policy.id = Some("pol-123".into());

        let state = flatten(plan["environment_id"].as_str().unwrap(), "pol-123", &policy);

        let mut expected = plan.clone();
        expected["id"] = json!("pol-123");
        expected["mobile"]["application"][0]["push_timeout_timeunit"] = json!("SECONDS");
        assert_eq!(state, expected);
    }

    #[test]
    fn test_expand_without_required_block_is_internal_error() {
        let mut plan = planned(full_config());
        plan["totp"] = Value::Null;
        let diags = expand(&plan).unwrap_err();
        assert!(diags.errors().next().unwrap().detail.contains("`totp`"));
    }

    #[test]
    fn test_deprecated_fido_settings_mapping() {
        let error = ApiError::status(
            400,
            Some(ErrorBody::new("INVALID_DATA", "Validation error").with_detail(detail(
                "INVALID_VALUE",
                "securityKey",
                "Deprecated Fido Settings cannot be used",
            ))),
        );
        let diags = deprecated_fido_settings(&error).unwrap();
        assert_eq!(diags.errors().next().unwrap().summary, "Invalid FIDO device types.");

        let other = ApiError::status(
            400,
            Some(ErrorBody::new("INVALID_DATA", "x").with_detail(detail("INVALID_VALUE", "name", "too long"))),
        );
        assert!(deprecated_fido_settings(&other).is_none());
        assert!(deprecated_fido_settings(&ApiError::status(500, None)).is_none());
    }

    #[test]
    fn test_delete_retries_sign_on_policy_conflict() {
        let referenced = ApiError::status(
            409,
            Some(ErrorBody::new("REQUEST_FAILED", "conflict").with_detail(detail(
                "INVALID_VALUE",
                "signOnPolicies",
                "referenced",
            ))),
        );
        assert!(delete_retryable(&referenced));
        assert!(delete_retryable(&ApiError::status(503, None)));
        assert!(!delete_retryable(&ApiError::status(409, None)));
        assert!(!delete_retryable(&ApiError::status(404, None)));
    }
}
