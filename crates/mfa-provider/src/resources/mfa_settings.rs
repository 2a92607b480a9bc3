//! `mfa_settings`: the environment's MFA settings singleton
//!
//! The settings always exist; create and update both replace them, and
//! delete restores the service defaults.

use crate::attrs;
use crate::scoped;
use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{Lockout, MfaSettings, Pairing, PhoneExtensions, UserSettings};
use mfa_provider_core::resource::get_str;
use mfa_provider_core::{
    Attribute, Block, Diagnostic, Diagnostics, ErrorMapper, Outcome, RequestContext, Resource,
    Retryable, Schema, StateUpgrader, Validator, default_create_read_retryable,
    default_retryable,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub const TYPE_NAME: &str = "mfa_settings";

const PAIRING_KEY_FORMATS: &[&str] = &["NUMERIC", "ALPHANUMERIC"];

fn schema() -> Schema {
    Schema::new(
        1,
        vec![
            Attribute::string("environment_id")
                .required()
                .force_new()
                .validate(Validator::ResourceId)
                .describe("The ID of the environment to configure MFA settings for."),
            Attribute::object(
                "lockout",
                Block::new(vec![
                    Attribute::int("failure_count")
                        .required()
                        .validate(Validator::IntAtLeast(0))
                        .describe("Maximum number of incorrect authentication attempts before the account is locked."),
                    Attribute::int("duration_seconds")
                        .validate(Validator::IntAtLeast(0))
                        .describe("Number of seconds to keep the account in a locked state."),
                ]),
            )
            .describe("MFA lockout settings."),
            Attribute::object(
                "pairing",
                Block::new(vec![
                    Attribute::int("max_allowed_devices")
                        .default(5)
                        .validate(Validator::IntBetween(1, 15))
                        .describe("Maximum number of MFA devices each user can have. Active and blocked devices count towards the limit."),
                    Attribute::string("pairing_key_format")
                        .required()
                        .validate(Validator::OneOf(PAIRING_KEY_FORMATS))
                        .describe("Type of pairing key issued: a 12-digit `NUMERIC` key or a 16-character `ALPHANUMERIC` key."),
                ]),
            )
            .required()
            .describe("MFA device pairing settings."),
            Attribute::object(
                "phone_extensions",
                Block::new(vec![Attribute::bool("enabled").default(false).describe(
                    "Allow one-time passwords to be delivered by voice to phone numbers that include extensions.",
                )]),
            )
            .default(json!({ "enabled": false }))
            .describe("Phone extension support."),
            Attribute::object(
                "users",
                Block::new(vec![Attribute::bool("mfa_enabled")
                    .default(true)
                    .describe("Enable MFA by default for new users.")]),
            )
            .default(json!({ "mfa_enabled": true }))
            .describe("Default settings for new users."),
        ],
    )
    .describe("Resource to manage the MFA settings for an environment.")
}

fn schema_v0() -> Schema {
    Schema::new(
        0,
        vec![
            Attribute::id(),
            Attribute::string("environment_id").required(),
            Attribute::bool("phone_extensions_enabled").default(false),
            Attribute::object_list(
                "pairing",
                Block::new(vec![
                    Attribute::int("max_allowed_devices").optional_computed(),
                    Attribute::string("pairing_key_format").required(),
                ]),
            ),
            Attribute::object_list(
                "lockout",
                Block::new(vec![
                    Attribute::int("failure_count").required(),
                    Attribute::int("duration_seconds"),
                ]),
            ),
            Attribute::object_list(
                "authentication",
                Block::new(vec![Attribute::string("device_selection").required()]),
            ),
        ],
    )
}

/// Single-block lists become objects, `phone_extensions_enabled` moves into
/// `phone_extensions`, and the `authentication` block and `id` are dropped.
fn upgrade_v0(state: &Value) -> Result<Value, Diagnostics> {
    let first = |name: &str| attrs::items(state, name).first().cloned().unwrap_or(Value::Null);
    let phone_extensions = match attrs::boolean(state, "phone_extensions_enabled") {
        Some(enabled) => json!({ "enabled": enabled }),
        None => Value::Null,
    };

    Ok(json!({
        "environment_id": state.get("environment_id"),
        "lockout": first("lockout"),
        "pairing": first("pairing"),
        "phone_extensions": phone_extensions,
        "users": null,
    }))
}

fn upgraders() -> Vec<StateUpgrader> {
    vec![StateUpgrader {
        prior_version: 0,
        prior_schema: schema_v0,
        upgrade: upgrade_v0,
    }]
}

pub(crate) fn expand(plan: &Value) -> Result<MfaSettings, Diagnostics> {
    let Some(pairing) = attrs::object(plan, "pairing") else {
        return Err(Diagnostic::internal("The `pairing` block is missing from the planned MFA settings.").into());
    };

    Ok(MfaSettings {
        pairing: Pairing {
            max_allowed_devices: attrs::int(pairing, "max_allowed_devices").unwrap_or(5),
            pairing_key_format: attrs::string(pairing, "pairing_key_format").unwrap_or_default(),
        },
        lockout: attrs::object(plan, "lockout").map(|lockout| Lockout {
            failure_count: attrs::int(lockout, "failure_count").unwrap_or_default(),
            duration_seconds: attrs::int(lockout, "duration_seconds"),
        }),
        phone_extensions: attrs::object(plan, "phone_extensions").map(|extensions| {
            PhoneExtensions {
                enabled: attrs::boolean(extensions, "enabled"),
            }
        }),
        users: attrs::object(plan, "users").map(|users| UserSettings {
            mfa_enabled: attrs::boolean(users, "mfa_enabled"),
        }),
        environment: None,
        updated_at: None,
    })
}

pub(crate) fn flatten(environment_id: &str, settings: &MfaSettings) -> Value {
    json!({
        "environment_id": settings
            .environment
            .as_ref()
            .map_or(environment_id, |environment| environment.id.as_str()),
        "lockout": settings.lockout.as_ref().map(|lockout| json!({
            "failure_count": lockout.failure_count,
            "duration_seconds": lockout.duration_seconds,
        })),
        "pairing": {
            "max_allowed_devices": settings.pairing.max_allowed_devices,
            "pairing_key_format": settings.pairing.pairing_key_format,
        },
        "phone_extensions": settings
            .phone_extensions
            .as_ref()
            .map(|extensions| json!({ "enabled": extensions.enabled })),
        "users": settings
            .users
            .as_ref()
            .map(|users| json!({ "mfa_enabled": users.mfa_enabled })),
    })
}

fn environment_id(value: &Value) -> Result<&str, Outcome> {
    get_str(value, "environment_id").ok_or_else(|| {
        Outcome::failed(Diagnostic::internal("The MFA settings environment ID is not set."))
    })
}

pub struct MfaSettingsResource {
    api: Arc<dyn MfaApi>,
}

impl MfaSettingsResource {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self { api }
    }

    /// Replace the settings and store what the service answers with
    async fn put(
        &self,
        ctx: &RequestContext,
        plan: &Value,
        retryable: Retryable,
    ) -> Outcome {
        let api = self.api.as_ref();
        let environment_id = match environment_id(plan) {
            Ok(environment_id) => environment_id,
            Err(outcome) => return outcome,
        };
        let settings = match expand(plan) {
            Ok(settings) => settings,
            Err(diags) => return Outcome::failed(diags),
        };
        let settings = &settings;

        let (updated, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "UpdateMFASettings",
            ErrorMapper::Default,
            Some(retryable),
            move || api.update_mfa_settings(ctx, environment_id, settings),
        )
        .await;

        match updated {
            _ if diags.has_error() => Outcome::failed(diags),
            Some(updated) => {
                info!(environment_id, "MFA settings updated");
                Outcome::with_diagnostics(Some(flatten(environment_id, &updated)), diags)
            }
            None => Outcome::removed(diags),
        }
    }
}

#[async_trait]
impl Resource for MfaSettingsResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn import_format(&self) -> Option<&'static str> {
        Some("environmentID")
    }

    fn import_attributes(&self, components: &[String]) -> Value {
        json!({ "environment_id": components.first() })
    }

    fn state_id(&self, attributes: &Value) -> String {
        get_str(attributes, "environment_id")
            .unwrap_or_default()
            .to_string()
    }

    fn upgraders(&self) -> Vec<StateUpgrader> {
        upgraders()
    }

    async fn create(&self, ctx: &RequestContext, plan: &Value) -> Outcome {
        self.put(ctx, plan, default_create_read_retryable).await
    }

    async fn read(&self, ctx: &RequestContext, state: &Value) -> Outcome {
        let api = self.api.as_ref();
        let environment_id = match environment_id(state) {
            Ok(environment_id) => environment_id,
            Err(outcome) => return outcome,
        };

        let (settings, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "ReadMFASettings",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_create_read_retryable),
            move || api.read_mfa_settings(ctx, environment_id),
        )
        .await;

        match settings {
            _ if diags.has_error() => Outcome::failed(diags),
            Some(settings) => {
                Outcome::with_diagnostics(Some(flatten(environment_id, &settings)), diags)
            }
            None => Outcome::removed(diags),
        }
    }

    async fn update(&self, ctx: &RequestContext, plan: &Value, _prior: &Value) -> Outcome {
        self.put(ctx, plan, default_retryable).await
    }

    async fn delete(&self, ctx: &RequestContext, state: &Value) -> Diagnostics {
        let api = self.api.as_ref();
        let environment_id = match environment_id(state) {
            Ok(environment_id) => environment_id,
            Err(outcome) => return outcome.diagnostics,
        };

        let (_, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "ResetMFASettings",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_retryable),
            move || api.reset_mfa_settings(ctx, environment_id),
        )
        .await;
        diags
    }
}
