//! `mfa_fido2_policy`: FIDO2 policies
//!
//! The API replaces the whole policy on update, so every write sends the
//! complete object built from the plan.

use crate::attrs;
use crate::scoped;
use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{
    BackupEligibility, DisplayNameAttribute, Fido2Policy, MdsAuthenticatorsRequirements,
    ObjectRef, SubAttribute, UserDisplayNameAttributes, UserPresenceTimeout, UserVerification,
};
use mfa_provider_core::resource::get_str;
use mfa_provider_core::{
    ApiError, Attribute, Block, Diagnostic, Diagnostics, ErrorMapper, Outcome, RequestContext,
    Resource, Schema, Validator, default_create_read_retryable, default_retryable,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

pub const TYPE_NAME: &str = "mfa_fido2_policy";

const ATTESTATION_REQUIREMENTS: &[&str] = &["DIRECT", "NONE"];
const AUTHENTICATOR_ATTACHMENTS: &[&str] = &["PLATFORM", "CROSS_PLATFORM", "BOTH"];
const DISCOVERABLE_CREDENTIALS: &[&str] = &["DISCOURAGED", "REQUIRED", "PREFERRED"];
const MDS_OPTIONS: &[&str] = &["NONE", "AUDIT_ONLY", "GLOBAL", "CERTIFIED", "SPECIFIC"];
const USER_VERIFICATION_OPTIONS: &[&str] = &["REQUIRED", "DISCOURAGED", "PREFERRED"];
const TIME_UNITS: &[&str] = &["MINUTES", "SECONDS"];

const RELYING_PARTY_PATTERN: &str = r"^(?:[\w-]+\.)+(?:[a-z]{2,}|xn--[a-z0-9]+)$";

const DEFAULT_PRESENCE_DURATION: i64 = 2;
const DEFAULT_PRESENCE_UNIT: &str = "MINUTES";

const DELETE_OPERATION: &str = "DeleteFIDO2Policy";

fn schema() -> Schema {
    Schema::new(
        0,
        vec![
            Attribute::id(),
            Attribute::string("environment_id")
                .required()
                .force_new()
                .validate(Validator::ResourceId)
                .describe("The ID of the environment to configure the FIDO2 policy in."),
            Attribute::string("name")
                .required()
                .validate(Validator::LengthAtLeast(1))
                .validate(Validator::LengthAtMost(256))
                .describe("A string that specifies the unique, friendly name for this FIDO2 policy."),
            Attribute::string("description")
                .describe("A string that specifies the description of the FIDO2 policy."),
            Attribute::bool("default")
                .computed()
                .describe("A boolean that describes whether this policy should serve as the default FIDO policy."),
            Attribute::string("attestation_requirements")
                .required()
                .validate(Validator::OneOf(ATTESTATION_REQUIREMENTS))
                .describe("A string that specifies the level of attestation to apply. If `NONE` is specified, the `mds_authenticators_requirements.option` parameter should also be set to `NONE`."),
            Attribute::string("authenticator_attachment")
                .required()
                .validate(Validator::OneOf(AUTHENTICATOR_ATTACHMENTS))
                .describe("A string that specifies the types of authenticators that are allowed."),
            Attribute::object(
                "backup_eligibility",
                Block::new(vec![
                    Attribute::bool("allow")
                        .required()
                        .describe("Whether to allow users to register and authenticate with a device that uses cloud-synced credentials."),
                    Attribute::bool("enforce_during_authentication")
                        .required()
                        .describe("Whether the backup eligibility of the device is checked again at each authentication attempt."),
                ]),
            )
            .required()
            .describe("Whether users may register and authenticate with a device that uses cloud-synced credentials, such as a passkey."),
            Attribute::string("device_display_name")
                .required()
                .validate(Validator::LengthAtLeast(1))
                .validate(Validator::LengthAtMost(100))
                .describe("The name to display for the device in registration and authentication windows."),
            Attribute::string("discoverable_credentials")
                .required()
                .validate(Validator::OneOf(DISCOVERABLE_CREDENTIALS))
                .describe("A string that specifies the behaviour when registered users are authenticating without providing credentials."),
            Attribute::object(
                "mds_authenticators_requirements",
                Block::new(vec![
                    Attribute::string_set("allowed_authenticator_ids")
                        .validate(Validator::SizeAtLeast(1))
                        .describe("The MDS identifiers of the authenticators allowed when `option` is `SPECIFIC`."),
                    Attribute::bool("enforce_during_authentication")
                        .required()
                        .describe("Whether device characteristics related to attestation are checked again at each authentication attempt."),
                    Attribute::string("option")
                        .required()
                        .validate(Validator::OneOf(MDS_OPTIONS))
                        .describe("The types of device that are allowed on the basis of the attestation provided."),
                ]),
            )
            .required()
            .describe("Whether attestation is requested from the authenticator, and whether it restricts authenticator usage."),
            Attribute::string("relying_party_id")
                .required()
                .validate(Validator::LengthAtLeast(1))
                .validate(Validator::Matches(RELYING_PARTY_PATTERN, "must be a valid domain name"))
                .describe("The ID of the relying party. The value should be a domain name, such as `bxretail.org` (in lower-case characters)."),
            Attribute::object(
                "user_display_name_attributes",
                Block::new(vec![
                    Attribute::object_list(
                        "attributes",
                        Block::new(vec![
                            Attribute::string("name")
                                .required()
                                .validate(Validator::LengthAtLeast(1))
                                .describe("The name of the user attribute, for example `username` or `email`."),
                            Attribute::object_list(
                                "sub_attributes",
                                Block::new(vec![
                                    Attribute::string("name")
                                        .required()
                                        .validate(Validator::LengthAtLeast(1))
                                        .describe("The name of a sub attribute, for example `given` or `formatted`."),
                                ]),
                            )
                            .validate(Validator::SizeAtLeast(1))
                            .describe("Sub attributes to use when `name` refers to a complex attribute."),
                        ]),
                    )
                    .required()
                    .validate(Validator::SizeAtLeast(1))
                    .describe("User attributes to display, in order of preference. Must include `username`."),
                ]),
            )
            .required()
            .describe("The user account attributes displayed during registration and authentication."),
            Attribute::object(
                "user_presence_timeout",
                Block::new(vec![
                    Attribute::int("duration")
                        .default(DEFAULT_PRESENCE_DURATION)
                        .describe("How long a user presence gesture is accepted. 1 - 10 in minutes, 60 - 600 in seconds."),
                    Attribute::string("time_unit")
                        .default(DEFAULT_PRESENCE_UNIT)
                        .validate(Validator::OneOf(TIME_UNITS))
                        .describe("The unit of `duration`."),
                ]),
            )
            .default(json!({
                "duration": DEFAULT_PRESENCE_DURATION,
                "time_unit": DEFAULT_PRESENCE_UNIT,
            }))
            .describe("How long a user has to perform a user presence gesture with their FIDO device. Defaults to 2 minutes."),
            Attribute::object(
                "user_verification",
                Block::new(vec![
                    Attribute::bool("enforce_during_authentication")
                        .required()
                        .describe("Whether device characteristics related to user verification are checked again at each authentication attempt."),
                    Attribute::string("option")
                        .required()
                        .validate(Validator::OneOf(USER_VERIFICATION_OPTIONS))
                        .describe("The type of user verification to perform."),
                ]),
            )
            .required()
            .describe("Whether the user must perform a gesture when registering or authenticating with their FIDO device."),
        ],
    )
    .describe("Resource to create and manage FIDO2 policies in an environment.")
}

fn combination_error(path: &str, detail: String) -> Diagnostic {
    Diagnostic::error("Invalid argument combination", detail).at(path)
}

/// Checks that span attributes of different nesting levels
fn check_combinations(config: &Value) -> Diagnostics {
    let mut diags = Diagnostics::new();

    let attestation = get_str(config, "attestation_requirements");
    let mds = attrs::object(config, "mds_authenticators_requirements");
    let option = mds.and_then(|mds| get_str(mds, "option"));

    if attestation == Some("NONE") && option.is_some_and(|option| option != "NONE") {
        diags.push(combination_error(
            "mds_authenticators_requirements.option",
            "The argument must be value \"NONE\" if value \"NONE\" is present at attestation_requirements".to_string(),
        ));
    }
    if option == Some("NONE") && attestation.is_some_and(|attestation| attestation != "NONE") {
        diags.push(combination_error(
            "attestation_requirements",
            "The argument must be value \"NONE\" if value \"NONE\" is present at mds_authenticators_requirements.option".to_string(),
        ));
    }

    if let (Some(mds), Some(option)) = (mds, option) {
        let allowed_ids = mds
            .get("allowed_authenticator_ids")
            .is_some_and(|ids| !ids.is_null());
        let path = "mds_authenticators_requirements.allowed_authenticator_ids";
        match (option, allowed_ids) {
            ("SPECIFIC", false) => diags.push(combination_error(
                path,
                "The argument is required when `option` is `SPECIFIC`.".to_string(),
            )),
            (option, true) if option != "SPECIFIC" => diags.push(combination_error(
                path,
                format!("The argument cannot be configured when `option` is `{}`.", option),
            )),
            _ => {}
        }
    }

    if let Some(display) = attrs::object(config, "user_display_name_attributes") {
        let has_username = attrs::items(display, "attributes")
            .iter()
            .any(|attribute| get_str(attribute, "name") == Some("username"));
        if !has_username {
            diags.push(
                Diagnostic::error(
                    "Invalid Attribute Value",
                    "The list of user display name attributes must contain the `username` attribute.",
                )
                .at("user_display_name_attributes.attributes"),
            );
        }
    }

    if let Some(timeout) = attrs::object(config, "user_presence_timeout") {
        let unit = get_str(timeout, "time_unit").unwrap_or(DEFAULT_PRESENCE_UNIT);
        let duration = attrs::int(timeout, "duration").unwrap_or(DEFAULT_PRESENCE_DURATION);
        let range = match unit {
            "SECONDS" => Some((60, 600)),
            "MINUTES" => Some((1, 10)),
            _ => None,
        };
        if let Some((min, max)) = range
            && !(min..=max).contains(&duration)
        {
            diags.push(
                Diagnostic::error(
                    "Invalid Attribute Value",
                    format!(
                        "If `time_unit` is `{}`, the allowed duration range is {} - {}, got {}.",
                        unit, min, max, duration
                    ),
                )
                .at("user_presence_timeout.duration"),
            );
        }
    }

    diags
}

pub(crate) fn expand(plan: &Value) -> Fido2Policy {
    let empty = Value::Null;
    let backup = attrs::object(plan, "backup_eligibility").unwrap_or(&empty);
    let mds = attrs::object(plan, "mds_authenticators_requirements").unwrap_or(&empty);
    let display = attrs::object(plan, "user_display_name_attributes").unwrap_or(&empty);
    let verification = attrs::object(plan, "user_verification").unwrap_or(&empty);

    let allowed_authenticators = mds
        .get("allowed_authenticator_ids")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(|id| ObjectRef { id: id.to_string() })
                .collect()
        });

    let attributes = attrs::items(display, "attributes")
        .iter()
        .map(|attribute| DisplayNameAttribute {
            name: attrs::string(attribute, "name").unwrap_or_default(),
            sub_attributes: attribute
                .get("sub_attributes")
                .and_then(Value::as_array)
                .map(|subs| {
                    subs.iter()
                        .map(|sub| SubAttribute {
                            name: attrs::string(sub, "name").unwrap_or_default(),
                        })
                        .collect()
                }),
        })
        .collect();

    let user_presence_timeout = attrs::object(plan, "user_presence_timeout").map(|timeout| {
        UserPresenceTimeout {
            duration: attrs::int(timeout, "duration").unwrap_or(DEFAULT_PRESENCE_DURATION),
            time_unit: attrs::string(timeout, "time_unit")
                .unwrap_or_else(|| DEFAULT_PRESENCE_UNIT.to_string()),
        }
    });

    Fido2Policy {
        id: None,
        environment: None,
        name: attrs::string(plan, "name").unwrap_or_default(),
        description: attrs::string(plan, "description"),
        default: Some(attrs::boolean(plan, "default").unwrap_or(false)),
        attestation_requirements: attrs::string(plan, "attestation_requirements").unwrap_or_default(),
        authenticator_attachment: attrs::string(plan, "authenticator_attachment").unwrap_or_default(),
        backup_eligibility: BackupEligibility {
            allow: attrs::boolean(backup, "allow").unwrap_or(false),
            enforce_during_authentication: attrs::boolean(backup, "enforce_during_authentication")
                .unwrap_or(false),
        },
        device_display_name: attrs::string(plan, "device_display_name").unwrap_or_default(),
        discoverable_credentials: attrs::string(plan, "discoverable_credentials").unwrap_or_default(),
        mds_authenticators_requirements: MdsAuthenticatorsRequirements {
            allowed_authenticators,
            enforce_during_authentication: attrs::boolean(mds, "enforce_during_authentication")
                .unwrap_or(false),
            option: attrs::string(mds, "option").unwrap_or_default(),
        },
        relying_party_id: attrs::string(plan, "relying_party_id").unwrap_or_default(),
        user_display_name_attributes: UserDisplayNameAttributes { attributes },
        user_presence_timeout,
        user_verification: UserVerification {
            enforce_during_authentication: attrs::boolean(
                verification,
                "enforce_during_authentication",
            )
            .unwrap_or(false),
            option: attrs::string(verification, "option").unwrap_or_default(),
        },
    }
}

pub(crate) fn flatten(environment_id: &str, id: &str, policy: &Fido2Policy) -> Value {
    let mds = &policy.mds_authenticators_requirements;
    let attributes: Vec<Value> = policy
        .user_display_name_attributes
        .attributes
        .iter()
        .map(|attribute| {
            json!({
                "name": attribute.name,
                "sub_attributes": attribute
                    .sub_attributes
                    .as_ref()
                    .filter(|subs| !subs.is_empty())
                    .map(|subs| subs.iter().map(|sub| json!({ "name": sub.name })).collect::<Vec<_>>()),
            })
        })
        .collect();

    json!({
        "id": policy.id.as_deref().unwrap_or(id),
        "environment_id": policy
            .environment
            .as_ref()
            .map(|environment| environment.id.as_str())
            .unwrap_or(environment_id),
        "name": policy.name,
        "description": policy.description,
        "default": policy.default,
        "attestation_requirements": policy.attestation_requirements,
        "authenticator_attachment": policy.authenticator_attachment,
        "backup_eligibility": {
            "allow": policy.backup_eligibility.allow,
            "enforce_during_authentication": policy.backup_eligibility.enforce_during_authentication,
        },
        "device_display_name": policy.device_display_name,
        "discoverable_credentials": policy.discoverable_credentials,
        "mds_authenticators_requirements": {
            "allowed_authenticator_ids": mds
                .allowed_authenticators
                .as_ref()
                .map(|allowed| allowed.iter().map(|a| a.id.as_str()).collect::<Vec<_>>()),
            "enforce_during_authentication": mds.enforce_during_authentication,
            "option": mds.option,
        },
        "relying_party_id": policy.relying_party_id,
        "user_display_name_attributes": {
            "attributes": (!attributes.is_empty()).then_some(attributes),
        },
        "user_presence_timeout": policy.user_presence_timeout.as_ref().map(|timeout| json!({
            "duration": timeout.duration,
            "time_unit": timeout.time_unit,
        })),
        "user_verification": {
            "enforce_during_authentication": policy.user_verification.enforce_during_authentication,
            "option": policy.user_verification.option,
        },
    })
}

/// The environment's default FIDO2 policy cannot be deleted; it is dropped
/// from state with a warning instead. Other failures map like any delete.
pub(crate) fn undeletable_default_policy(error: &ApiError) -> Option<Diagnostics> {
    let is_default = error.first_detail().is_some_and(|detail| {
        detail.code.as_deref() == Some("CONSTRAINT_VIOLATION")
            && detail
                .message
                .as_deref()
                .is_some_and(|message| message.contains("cannot delete the default policy"))
    });

    if is_default {
        warn!("Default FIDO2 policy left in place");
        return Some(
            Diagnostic::warning(
                "Cannot delete the default MFA FIDO2 policy",
                "Due to API restrictions, the provider cannot delete the default FIDO2 policy for an environment.  The policy has been removed from state but has been left in place in the service.",
            )
            .into(),
        );
    }
    Some(ErrorMapper::ResourceNotFoundWarning.map(DELETE_OPERATION, error))
}

pub struct Fido2PolicyResource {
    api: Arc<dyn MfaApi>,
}

impl Fido2PolicyResource {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self { api }
    }

    async fn read_by_id(&self, ctx: &RequestContext, environment_id: &str, id: &str) -> Outcome {
        let api = self.api.as_ref();
        let (policy, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "ReadOneFIDO2Policy",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_create_read_retryable),
            move || api.read_fido2_policy(ctx, environment_id, id),
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
            "The FIDO2 policy state is missing its environment or policy ID.",
        ))),
    }
}

#[async_trait]
impl Resource for Fido2PolicyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn validate_config(&self, config: &Value) -> Diagnostics {
        check_combinations(config)
    }

    fn import_format(&self) -> Option<&'static str> {
        Some("environmentID/fido2PolicyID")
    }

    fn import_attributes(&self, components: &[String]) -> Value {
        json!({ "environment_id": components.first(), "id": components.get(1) })
    }

    async fn create(&self, ctx: &RequestContext, plan: &Value) -> Outcome {
        let api = self.api.as_ref();
        let Some(environment_id) = get_str(plan, "environment_id") else {
            return Outcome::failed(Diagnostic::internal(
                "The FIDO2 policy plan is missing its environment ID.",
            ));
        };
        let request = &expand(plan);

        let (created, mut diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "CreateFIDO2Policy",
            ErrorMapper::Default,
            Some(default_create_read_retryable),
            move || api.create_fido2_policy(ctx, environment_id, request),
        )
        .await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        let Some(id) = created.and_then(|policy| policy.id) else {
            diags.push(Diagnostic::internal(
                "The service did not return an ID for the created FIDO2 policy.",
            ));
            return Outcome::failed(diags);
        };

        info!(environment_id, id = %id, "FIDO2 policy created");
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
            "UpdateFIDO2Policy",
            ErrorMapper::Default,
            Some(default_retryable),
            move || api.update_fido2_policy(ctx, environment_id, id, request),
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
            DELETE_OPERATION,
            ErrorMapper::Custom(undeletable_default_policy),
            Some(default_retryable),
            move || api.delete_fido2_policy(ctx, environment_id, id),
        )
        .await;
        diags
    }
}
