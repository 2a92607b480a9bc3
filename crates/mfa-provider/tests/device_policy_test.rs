mod common;

use common::{APP_ID, ENV_ID, FakeMfaApi, ctx, forbidden, native_application};
use mfa_provider::MfaProvider;
use mfa_provider_client::models::{ApplicationMobile, IntegrityDetection};
use mfa_provider_core::lifecycle::{apply, import, plan, refresh};
use mfa_provider_core::{ActionType, ApiError, Diagnostics, ErrorBody, ErrorDetail, ResourceState};
use serde_json::{Value, json};

fn config() -> Value {
    json!({
        "environment_id": ENV_ID,
        "name": "p1",
        "sms": { "enabled": true, "otp_lifetime_duration": 60, "otp_lifetime_timeunit": "SECONDS" },
        "voice": { "enabled": false },
        "email": { "enabled": false },
        "mobile": { "enabled": false },
        "totp": { "enabled": false },
        "security_key": { "enabled": false },
        "platform": { "enabled": false },
    })
}

fn with_mobile_application(mut config: Value, application: Value) -> Value {
    config["mobile"] = json!({ "enabled": true, "application": [application] });
    config
}

async fn create(provider: &MfaProvider, config: &Value) -> (Option<ResourceState>, Diagnostics) {
    let resource = provider.resource("mfa_policy").unwrap();
    let (change, diags) = plan(resource.as_ref(), None, Some(config));
    assert!(!diags.has_error(), "{:?}", diags);
    let change = change.unwrap();
    assert_eq!(change.action.action_type, ActionType::Create);
    apply(resource.as_ref(), &ctx(), &change, None).await
}

#[tokio::test]
async fn test_create_mfa_policy() {
    let api = FakeMfaApi::new();
    api.next_id("pol-123");
    let provider = MfaProvider::new(api.clone());

    let (state, diags) = create(&provider, &config()).await;
    assert!(!diags.has_error(), "{:?}", diags);

    let state = state.unwrap();
    assert_eq!(state.id, "pol-123");
    assert_eq!(state.attributes["name"], json!("p1"));
    assert_eq!(state.attributes["sms"]["otp_lifetime_duration"], json!(60));

    let calls = api.calls("create_device_policy");
    assert_eq!(calls.len(), 1);
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["sms"]["enabled"], json!(true));
    assert_eq!(
        body["sms"]["otp"]["lifeTime"],
        json!({ "duration": 60, "timeUnit": "SECONDS" })
    );
    for device in ["voice", "email", "mobile", "totp", "securityKey", "platform"] {
        assert_eq!(body[device]["enabled"], json!(false), "{}", device);
    }
    assert!(body.get("fido2").is_none());
    assert_eq!(body["forSignOnPolicy"], json!(false));
}

#[tokio::test]
async fn test_refresh_after_remote_deletion() {
    let api = FakeMfaApi::new();
    api.next_id("pol-123");
    let provider = MfaProvider::new(api.clone());
    let (state, _) = create(&provider, &config()).await;
    let state = state.unwrap();

    api.state().device_policies.clear();
    let resource = provider.resource("mfa_policy").unwrap();
    let (refreshed, diags) = refresh(resource.as_ref(), &ctx(), &state).await;

    assert!(refreshed.is_removed());
    assert_eq!(refreshed.attributes, state.attributes);
    assert!(!diags.has_error());
    assert_eq!(diags.warnings().count(), 1);
    assert!(api.calls("update_device_policy").is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());
    let (state, _) = create(&provider, &config()).await;
    let state = state.unwrap();
    let resource = provider.resource("mfa_policy").unwrap();

    let diags = resource.delete(&ctx(), &state.attributes).await;
    assert!(diags.is_empty());

    let diags = resource.delete(&ctx(), &state.attributes).await;
    assert!(!diags.has_error());
    assert_eq!(diags.warnings().count(), 1);
}

#[tokio::test]
async fn test_delete_retries_while_referenced_by_sign_on_policy() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());
    let (state, _) = create(&provider, &config()).await;
    let state = state.unwrap();

    let conflict = ApiError::status(
        409,
        Some(
            ErrorBody::new("INVALID_DATA", "The request could not be completed.").with_detail(
                ErrorDetail {
                    code: Some("INVALID_VALUE".into()),
                    target: Some("signOnPolicies".into()),
                    message: Some("The policy is in use by a sign-on policy.".into()),
                    inner_error: None,
                },
            ),
        ),
    );
    api.fail_next("delete_device_policy", conflict);

    let resource = provider.resource("mfa_policy").unwrap();
    let diags = resource.delete(&ctx(), &state.attributes).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert_eq!(api.calls("delete_device_policy").len(), 2);
    assert!(api.state().device_policies.is_empty());
}

#[tokio::test]
async fn test_update_sends_full_policy() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());
    let (prior, _) = create(&provider, &config()).await;
    let prior = prior.unwrap();

    let mut changed = config();
    changed["name"] = json!("p2");
    let resource = provider.resource("mfa_policy").unwrap();
    let (change, _) = plan(resource.as_ref(), Some(&prior), Some(&changed));
    let change = change.unwrap();
    assert_eq!(change.action.action_type, ActionType::Update);

    let (state, diags) = apply(resource.as_ref(), &ctx(), &change, Some(&prior)).await;
    assert!(!diags.has_error(), "{:?}", diags);
    let state = state.unwrap();
    assert_eq!(state.id, prior.id);
    assert_eq!(state.attributes["name"], json!("p2"));

    let body = api.calls("update_device_policy")[0].body.clone().unwrap();
    assert_eq!(body["name"], json!("p2"));
    assert_eq!(body["sms"]["enabled"], json!(true));
}

#[tokio::test]
async fn test_update_retries_transient_failure() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());
    let (prior, _) = create(&provider, &config()).await;
    let prior = prior.unwrap();

    let mut changed = config();
    changed["name"] = json!("p2");
    let resource = provider.resource("mfa_policy").unwrap();
    let (change, _) = plan(resource.as_ref(), Some(&prior), Some(&changed));

    api.fail_next("update_device_policy", ApiError::Transport("connection reset".into()));
    let (state, diags) = apply(resource.as_ref(), &ctx(), &change.unwrap(), Some(&prior)).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert_eq!(state.unwrap().attributes["name"], json!("p2"));
    assert_eq!(api.calls("update_device_policy").len(), 2);
}

#[tokio::test]
async fn test_deprecated_fido_settings_are_reported() {
    let api = FakeMfaApi::new();
    api.fail_next(
        "create_device_policy",
        ApiError::status(
            400,
            Some(
                ErrorBody::new("INVALID_DATA", "The request could not be completed.").with_detail(
                    ErrorDetail {
                        code: Some("INVALID_VALUE".into()),
                        target: Some("securityKey".into()),
                        message: Some("Deprecated Fido Settings are not supported".into()),
                        inner_error: None,
                    },
                ),
            ),
        ),
    );
    let provider = MfaProvider::new(api.clone());

    let (state, diags) = create(&provider, &config()).await;
    assert!(state.is_none());
    let error = diags.errors().next().unwrap();
    assert_eq!(error.summary, "Invalid FIDO device types.");
    assert!(error.detail.contains("`fido2`"));
}

#[tokio::test]
async fn test_mobile_application_pre_flight() {
    let api = FakeMfaApi::new();
    api.add_application(native_application(APP_ID));
    let provider = MfaProvider::new(api.clone());

    let config = with_mobile_application(
        config(),
        json!({ "id": APP_ID, "push_enabled": true, "otp_enabled": true }),
    );
    let (state, diags) = create(&provider, &config).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert!(state.is_some());
    assert_eq!(
        api.operations()[..2],
        ["read_application", "create_device_policy"]
    );
}

#[tokio::test]
async fn test_pre_flight_rejects_missing_application() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());

    let config = with_mobile_application(
        config(),
        json!({ "id": APP_ID, "push_enabled": true, "otp_enabled": true }),
    );
    let (state, diags) = create(&provider, &config).await;
    assert!(state.is_none());
    assert!(diags.has_error());
    assert!(api.calls("create_device_policy").is_empty());
}

#[tokio::test]
async fn test_pre_flight_rejects_non_native_application() {
    let api = FakeMfaApi::new();
    let mut application = native_application(APP_ID);
    application.application_type = "WEB_APP".to_string();
    api.add_application(application);
    let provider = MfaProvider::new(api.clone());

    let config = with_mobile_application(
        config(),
        json!({ "id": APP_ID, "push_enabled": true, "otp_enabled": true }),
    );
    let (_, diags) = create(&provider, &config).await;
    assert!(diags.has_error());
    assert!(api.calls("create_device_policy").is_empty());
}

#[tokio::test]
async fn test_pre_flight_requires_integrity_detection_when_enabled() {
    let api = FakeMfaApi::new();
    let mut application = native_application(APP_ID);
    application.mobile = Some(ApplicationMobile {
        bundle_id: Some("com.example.authenticator".to_string()),
        package_name: None,
        integrity_detection: Some(IntegrityDetection {
            mode: Some("ENABLED".to_string()),
        }),
    });
    api.add_application(application);
    let provider = MfaProvider::new(api.clone());

    let missing = with_mobile_application(
        config(),
        json!({ "id": APP_ID, "push_enabled": true, "otp_enabled": true }),
    );
    let (_, diags) = create(&provider, &missing).await;
    assert!(diags.has_error());

    let present = with_mobile_application(
        config(),
        json!({
            "id": APP_ID,
            "push_enabled": true,
            "otp_enabled": true,
            "integrity_detection": "permissive",
        }),
    );
    let (state, diags) = create(&provider, &present).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert!(state.is_some());
}

#[tokio::test]
async fn test_read_in_deleted_environment_is_removed() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());
    let (state, _) = create(&provider, &config()).await;
    let state = state.unwrap();

    api.state().environments.clear();
    let resource = provider.resource("mfa_policy").unwrap();
    let (refreshed, diags) = refresh(resource.as_ref(), &ctx(), &state).await;

    assert!(refreshed.is_removed());
    assert!(!diags.has_error(), "{:?}", diags);
    assert!(api.operations().contains(&"read_environment"));
}

#[tokio::test]
async fn test_permission_error_in_live_environment_is_fatal() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());
    let (state, _) = create(&provider, &config()).await;
    let state = state.unwrap();

    api.fail_next("read_device_policy", forbidden());
    let resource = provider.resource("mfa_policy").unwrap();
    let (refreshed, diags) = refresh(resource.as_ref(), &ctx(), &state).await;

    assert!(diags.has_error());
    assert_eq!(refreshed.id, state.id);
}

#[tokio::test]
async fn test_create_read_retries_transient_failures() {
    let api = FakeMfaApi::new();
    api.fail_next("create_device_policy", ApiError::status(503, None));
    let provider = MfaProvider::new(api.clone());

    let (state, diags) = create(&provider, &config()).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert!(state.is_some());
    assert_eq!(api.calls("create_device_policy").len(), 2);
}

#[tokio::test]
async fn test_import_by_environment_and_policy_id() {
    let api = FakeMfaApi::new();
    api.add_device_policy("pol-9", "Imported");
    let provider = MfaProvider::new(api.clone());
    let resource = provider.resource("mfa_policy").unwrap();

    let (state, diags) = import(resource.as_ref(), &ctx(), &format!("{}/pol-9", ENV_ID)).await;
    assert!(!diags.has_error(), "{:?}", diags);
    let state = state.unwrap();
    assert_eq!(state.id, "pol-9");
    assert_eq!(state.attributes["environment_id"], json!(ENV_ID));

    api.state().device_policies.clear();
    let (state, diags) = import(resource.as_ref(), &ctx(), &format!("{}/pol-9", ENV_ID)).await;
    assert!(state.is_none());
    assert!(
        diags
            .errors()
            .any(|d| d.summary == "Cannot import non-existent remote object")
    );
}
