//! `fido_policy`: legacy FIDO policies

use crate::attrs;
use crate::scoped;
use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{AllowedAuthenticator, FidoPolicy};
use mfa_provider_core::resource::get_str;
use mfa_provider_core::{
    Attribute, Diagnostic, Diagnostics, ErrorMapper, Outcome, RequestContext, Resource, Schema,
    Validator, default_create_read_retryable, default_retryable,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub const TYPE_NAME: &str = "fido_policy";

const ATTESTATION_REQUIREMENTS: &[&str] = &["NONE", "AUDIT_ONLY", "GLOBAL", "CERTIFIED", "SPECIFIC"];
const RESIDENT_KEY_REQUIREMENTS: &[&str] = &["DISCOURAGED", "REQUIRED"];

const DEPRECATION: &str = "This resource is deprecated, please use the `mfa_fido2_policy` resource going forward.  This resource is no longer configurable for environments created after 19th June 2023, nor environments that have been upgraded to use the latest FIDO2 policies. Existing environments that were created before 19th June 2023 and have not been upgraded can continue to use this resource to facilitate migration.";

fn schema() -> Schema {
    Schema::new(
        0,
        vec![
            Attribute::id(),
            Attribute::string("environment_id")
                .required()
                .force_new()
                .validate(Validator::ResourceId)
                .describe("The ID of the environment to create the FIDO policy in."),
            Attribute::string("name")
                .required()
                .validate(Validator::LengthAtLeast(1))
                .describe("The name to use for the FIDO policy."),
            Attribute::string("description").describe("Description of the FIDO policy."),
            Attribute::string("attestation_requirements")
                .required()
                .validate(Validator::OneOf(ATTESTATION_REQUIREMENTS))
                .describe("Whether attestation is requested from the authenticator, and whether it restricts which authenticators can be used."),
            Attribute::string_set("allowed_authenticators").describe(
                "If `attestation_requirements` is set to `SPECIFIC`, the IDs of the authenticators to allow.",
            ),
            Attribute::bool("enforce_during_authentication")
                .default(false)
                .describe("Apply the policy at each authentication as well as at registration. Only relevant with `SPECIFIC` attestation."),
            Attribute::bool("default")
                .computed()
                .describe("Whether this policy serves as the default FIDO policy."),
            Attribute::string("resident_key_requirement")
                .required()
                .validate(Validator::OneOf(RESIDENT_KEY_REQUIREMENTS))
                .describe("Used to enable resident keys."),
        ],
    )
    .describe("Resource to create and manage MFA FIDO Policies in an environment.")
    .deprecated(DEPRECATION)
}

pub(crate) fn expand(plan: &Value) -> FidoPolicy {
    let allowed: Vec<AllowedAuthenticator> = attrs::items(plan, "allowed_authenticators")
        .iter()
        .filter_map(Value::as_str)
        .map(|id| AllowedAuthenticator { id: id.to_string() })
        .collect();

    FidoPolicy {
        id: None,
        name: attrs::string(plan, "name").unwrap_or_default(),
        description: attrs::string(plan, "description"),
        attestation_requirements: attrs::string(plan, "attestation_requirements").unwrap_or_default(),
        resident_key_requirement: attrs::string(plan, "resident_key_requirement").unwrap_or_default(),
        allowed_authenticators: (!allowed.is_empty()).then_some(allowed),
        enforce_during_authentication: attrs::boolean(plan, "enforce_during_authentication")
            .filter(|enforce| *enforce),
        default: None,
    }
}

pub(crate) fn flatten(environment_id: &str, id: &str, policy: &FidoPolicy) -> Value {
    json!({
        "id": policy.id.as_deref().unwrap_or(id),
        "environment_id": environment_id,
        "name": policy.name,
        "description": policy.description,
        "attestation_requirements": policy.attestation_requirements,
        "allowed_authenticators": policy
            .allowed_authenticators
            .as_ref()
            .map(|allowed| allowed.iter().map(|a| a.id.as_str()).collect::<Vec<_>>()),
        "enforce_during_authentication": policy.enforce_during_authentication.unwrap_or(false),
        "default": policy.default,
        "resident_key_requirement": policy.resident_key_requirement,
    })
}

pub struct FidoPolicyResource {
    api: Arc<dyn MfaApi>,
}

impl FidoPolicyResource {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self { api }
    }

    async fn read_by_id(&self, ctx: &RequestContext, environment_id: &str, id: &str) -> Outcome {
        let api = self.api.as_ref();
        let (policy, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "ReadOneFidoPolicy",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_create_read_retryable),
            move || api.read_fido_policy(ctx, environment_id, id),
        )
        .await;

        match policy {
            _ if diags.has_error() => Outcome::failed(diags),
            Some(policy) => {
                Outcome::with_diagnostics(Some(flatten(environment_id, id, &policy)), diags)
            }
            None => Outcome::removed(diags),
        }
    }
}

fn ids(state: &Value) -> Result<(&str, &str), Outcome> {
    match (get_str(state, "environment_id"), get_str(state, "id")) {
        (Some(environment_id), Some(id)) => Ok((environment_id, id)),
        _ => Err(Outcome::failed(Diagnostic::internal(
            "The FIDO policy state is missing its environment or policy ID.",
        ))),
    }
}

#[async_trait]
impl Resource for FidoPolicyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn import_format(&self) -> Option<&'static str> {
        Some("environmentID/fidoPolicyID")
    }

    fn import_attributes(&self, components: &[String]) -> Value {
        json!({ "environment_id": components.first(), "id": components.get(1) })
    }

    async fn create(&self, ctx: &RequestContext, plan: &Value) -> Outcome {
        let api = self.api.as_ref();
        let Some(environment_id) = get_str(plan, "environment_id") else {
            return Outcome::failed(Diagnostic::internal(
                "The FIDO policy plan is missing its environment ID.",
            ));
        };
        let request = &expand(plan);

        let (created, mut diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "CreateFidoPolicy",
            ErrorMapper::Default,
            Some(default_create_read_retryable),
            move || api.create_fido_policy(ctx, environment_id, request),
        )
        .await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        let Some(id) = created.and_then(|policy| policy.id) else {
            diags.push(Diagnostic::internal(
                "The service did not return an ID for the created FIDO policy.",
            ));
            return Outcome::failed(diags);
        };

        info!(environment_id, id = %id, "FIDO policy created");
        self.read_by_id(ctx, environment_id, &id).await.after(diags)
    }

    async fn read(&self, ctx: &RequestContext, state: &Value) -> Outcome {
        match ids(state) {
            Ok((environment_id, id)) => self.read_by_id(ctx, environment_id, id).await,
            Err(outcome) => outcome,
        }
    }

    async fn update(&self, ctx: &RequestContext, plan: &Value, prior: &Value) -> Outcome {
        let api = self.api.as_ref();
        let (environment_id, id) = match ids(prior) {
            Ok(ids) => ids,
            Err(outcome) => return outcome,
        };
        let request = &expand(plan);

        let (_, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "UpdateFIDOPolicy",
            ErrorMapper::Default,
            Some(default_retryable),
            move || api.update_fido_policy(ctx, environment_id, id, request),
        )
        .await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        self.read_by_id(ctx, environment_id, id).await.after(diags)
    }

    async fn delete(&self, ctx: &RequestContext, state: &Value) -> Diagnostics {
        let api = self.api.as_ref();
        let (environment_id, id) = match ids(state) {
            Ok(ids) => ids,
            Err(outcome) => return outcome.diagnostics,
        };

        let (_, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "DeleteFidoPolicy",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_retryable),
            move || api.delete_fido_policy(ctx, environment_id, id),
        )
        .await;
        diags
    }
}
