//! `mfa_policies`: bulk migration of device policies to FIDO2 policies
//!
//! The migration is a one-shot POST. Nothing about it can be read back.

use crate::attrs;
use crate::scoped;
use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{MigrateData, MigrateRequest};
use mfa_provider_core::resource::get_str;
use mfa_provider_core::{
    Attribute, Block, Diagnostic, Diagnostics, ErrorMapper, Outcome, RequestContext, Resource,
    Schema, Validator, default_create_read_retryable,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const TYPE_NAME: &str = "mfa_policies";

fn schema() -> Schema {
    Schema::new(
        0,
        vec![
            Attribute::id(),
            Attribute::string("environment_id")
                .required()
                .force_new()
                .validate(Validator::ResourceId)
                .describe("The ID of the environment to configure MFA device policies in."),
            Attribute::object_set(
                "migrate_data",
                Block::new(vec![
                    Attribute::string("device_authentication_policy_id")
                        .required()
                        .validate(Validator::ResourceId)
                        .describe("The ID of an MFA device policy to migrate."),
                    Attribute::string("fido2_policy_id")
                        .validate(Validator::ResourceId)
                        .describe("The ID of a FIDO2 policy to assign to the new FIDO2 device type."),
                ]),
            )
            .required()
            .force_new()
            .describe("MFA device policies to migrate."),
        ],
    )
    .describe("Resource to create and manage bulk settings of MFA device policies in an environment.  The migration runs once on create; read, update and delete make no API calls.")
}

pub(crate) fn expand(plan: &Value) -> MigrateRequest {
    MigrateRequest {
        migrate_data: attrs::items(plan, "migrate_data")
            .iter()
            .map(|item| MigrateData {
                device_authentication_policy_id: attrs::string(
                    item,
                    "device_authentication_policy_id",
                )
                .unwrap_or_default(),
                fido2_policy_id: attrs::non_empty(item, "fido2_policy_id"),
            })
            .collect(),
    }
}

pub struct PoliciesMigrationResource {
    api: Arc<dyn MfaApi>,
}

impl PoliciesMigrationResource {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Resource for PoliciesMigrationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, ctx: &RequestContext, plan: &Value) -> Outcome {
        let api = self.api.as_ref();
        let Some(environment_id) = get_str(plan, "environment_id") else {
            return Outcome::failed(Diagnostic::internal(
                "The MFA policies plan is missing its environment ID.",
            ));
        };
        let request = &expand(plan);

        let (_, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "CreateDeviceAuthenticationPolicies",
            ErrorMapper::Default,
            Some(default_create_read_retryable),
            move || api.migrate_device_policies(ctx, environment_id, request),
        )
        .await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        let mut state = plan.clone();
        if get_str(&state, "id").is_none() {
            state["id"] = json!(Uuid::new_v4().to_string());
        }
        info!(
            environment_id,
            policies = request.migrate_data.len(),
            "MFA device policies migrated"
        );
        Outcome::with_diagnostics(Some(state), diags)
    }

    async fn read(&self, _ctx: &RequestContext, state: &Value) -> Outcome {
        Outcome::ok(state.clone())
    }

    async fn update(&self, _ctx: &RequestContext, plan: &Value, prior: &Value) -> Outcome {
        let mut state = plan.clone();
        if let Some(id) = prior.get("id") {
            state["id"] = id.clone();
        }
        Outcome::ok(state)
    }

    async fn delete(&self, _ctx: &RequestContext, _state: &Value) -> Diagnostics {
        Diagnostics::new()
    }
}
