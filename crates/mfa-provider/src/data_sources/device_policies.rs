//! `mfa_device_policies` / `mfa_policies`: IDs of every device policy in an environment

use crate::scoped;
use async_trait::async_trait;
use futures_util::StreamExt;
use mfa_provider_client::MfaApi;
use mfa_provider_core::resource::get_str;
use mfa_provider_core::{
    Attribute, DataSource, Diagnostic, Diagnostics, ErrorMapper, Outcome, RequestContext, Schema,
    Validator, call_with_retry, default_retryable, paginate,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const TYPE_NAME: &str = "mfa_device_policies";

/// Name the same data source is also registered under
pub const LEGACY_TYPE_NAME: &str = "mfa_policies";

const OPERATION: &str = "ReadDeviceAuthenticationPolicies";

fn schema() -> Schema {
    Schema::new(
        0,
        vec![
            Attribute::string("id").computed(),
            Attribute::string("environment_id")
                .required()
                .validate(Validator::ResourceId)
                .describe("The ID of the environment to filter MFA device policies from."),
            Attribute::string_set("ids")
                .computed()
                .describe("The list of resulting IDs of MFA device policies that have been successfully retrieved."),
        ],
    )
    .describe("Datasource to retrieve the IDs of multiple MFA device policies.")
}

pub struct DevicePoliciesDataSource {
    api: Arc<dyn MfaApi>,
    type_name: &'static str,
}

impl DevicePoliciesDataSource {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self::named(api, TYPE_NAME)
    }

    pub fn named(api: Arc<dyn MfaApi>, type_name: &'static str) -> Self {
        Self { api, type_name }
    }

    /// Collect the IDs from every page. Each page is retried on transient
    /// failures; iteration stops at the first page that still fails.
    async fn collect_ids(
        &self,
        ctx: &RequestContext,
        environment_id: &str,
    ) -> (Vec<String>, Diagnostics) {
        let api = self.api.as_ref();
        let pages = paginate(ctx, move |cursor| async move {
            call_with_retry(ctx, OPERATION, Some(default_retryable), || {
                let cursor = cursor.clone();
                async move {
                    let result = api.list_device_policies(ctx, environment_id, cursor).await;
                    scoped::probe_environment(api, ctx, environment_id, result).await
                }
            })
            .await
        });
        let mut pages = std::pin::pin!(pages);

        let mut ids = Vec::new();
        let mut page_count = 0u32;
        while let Some(page) = pages.next().await {
            match page {
                Ok(response) => {
                    page_count += 1;
                    ids.extend(response.value.items.into_iter().filter_map(|policy| policy.id));
                }
                // A gone environment maps to a warning and an empty result.
                Err(error) => {
                    return (
                        Vec::new(),
                        ErrorMapper::ResourceNotFoundWarning.map(OPERATION, &error),
                    );
                }
            }
        }

        debug!(environment_id, pages = page_count, policies = ids.len(), "Device policies listed");
        (ids, Diagnostics::new())
    }
}

#[async_trait]
impl DataSource for DevicePoliciesDataSource {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn read(&self, ctx: &RequestContext, config: &Value) -> Outcome {
        let Some(environment_id) = get_str(config, "environment_id") else {
            return Outcome::failed(Diagnostic::internal(
                "The data source configuration is missing its environment ID.",
            ));
        };

        let (ids, diags) = self.collect_ids(ctx, environment_id).await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        Outcome::with_diagnostics(
            Some(json!({
                "id": Uuid::new_v4().to_string(),
                "environment_id": environment_id,
                "ids": ids,
            })),
            diags,
        )
    }
}
