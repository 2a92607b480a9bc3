mod common;

use common::{ENV_ID, FakeMfaApi, GONE_ENV_ID, ctx};
use mfa_provider::MfaProvider;
use mfa_provider_core::ApiError;
use mfa_provider_core::lifecycle::query;
use serde_json::json;
use std::collections::BTreeSet;

fn ids(value: &serde_json::Value) -> BTreeSet<String> {
    value["ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_ids_span_every_page() {
    let api = FakeMfaApi::new();
    for n in 0..7 {
        api.add_device_policy(&format!("pol-{}", n), &format!("Policy {}", n));
    }
    api.state().page_size = 3;
    let provider = MfaProvider::new(api.clone());

    for type_name in ["mfa_device_policies", "mfa_policies"] {
        let data_source = provider.data_source(type_name).unwrap();
        let (value, diags) =
            query(data_source.as_ref(), &ctx(), &json!({ "environment_id": ENV_ID })).await;
        assert!(diags.is_empty(), "{:?}", diags);

        let value = value.unwrap();
        let expected: BTreeSet<String> = (0..7).map(|n| format!("pol-{}", n)).collect();
        assert_eq!(ids(&value), expected);
        assert!(!value["id"].as_str().unwrap().is_empty());
        assert_eq!(value["environment_id"], json!(ENV_ID));
    }
    assert_eq!(api.calls("list_device_policies").len(), 6);
}

#[tokio::test]
async fn test_page_error_stops_iteration() {
    let api = FakeMfaApi::new();
    for n in 0..4 {
        api.add_device_policy(&format!("pol-{}", n), "Policy");
    }
    api.state().page_size = 2;
    api.pass_next("list_device_policies");
    api.fail_next("list_device_policies", ApiError::status(500, None));
    let provider = MfaProvider::new(api.clone());
    let data_source = provider.data_source("mfa_device_policies").unwrap();

    let (value, diags) =
        query(data_source.as_ref(), &ctx(), &json!({ "environment_id": ENV_ID })).await;
    assert!(value.is_none());
    assert!(diags.has_error());
    assert_eq!(api.calls("list_device_policies").len(), 2);
}

#[tokio::test]
async fn test_deleted_environment_yields_warning() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api.clone());
    let data_source = provider.data_source("mfa_device_policies").unwrap();

    let (value, diags) =
        query(data_source.as_ref(), &ctx(), &json!({ "environment_id": GONE_ENV_ID })).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert_eq!(diags.warnings().count(), 1);
    assert_eq!(value.unwrap()["ids"], json!([]));
    assert_eq!(
        api.operations(),
        vec!["list_device_policies", "read_environment"]
    );
}

#[tokio::test]
async fn test_transient_page_failure_is_retried() {
    let api = FakeMfaApi::new();
    for n in 0..4 {
        api.add_device_policy(&format!("pol-{}", n), "Policy");
    }
    api.state().page_size = 2;
    api.pass_next("list_device_policies");
    api.fail_next("list_device_policies", ApiError::status(503, None));
    let provider = MfaProvider::new(api.clone());
    let data_source = provider.data_source("mfa_device_policies").unwrap();

    let (value, diags) =
        query(data_source.as_ref(), &ctx(), &json!({ "environment_id": ENV_ID })).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(ids(&value.unwrap()).len(), 4);
    assert_eq!(api.calls("list_device_policies").len(), 3);
}

#[tokio::test]
async fn test_each_read_gets_a_fresh_id() {
    let api = FakeMfaApi::new();
    let provider = MfaProvider::new(api);
    let data_source = provider.data_source("mfa_policies").unwrap();
    let config = json!({ "environment_id": ENV_ID });

    let (first, _) = query(data_source.as_ref(), &ctx(), &config).await;
    let (second, _) = query(data_source.as_ref(), &ctx(), &config).await;
    assert_ne!(first.unwrap()["id"], second.unwrap()["id"]);
}
