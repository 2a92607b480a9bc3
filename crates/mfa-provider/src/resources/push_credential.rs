//! `application_push_credential`: push service credentials of a mobile application
//!
//! The service never returns secret material. Read stores
//! [`DUMMY_SUPPRESS_VALUE`] in every secret field of the variant the service
//! reports, and the schema suppresses diffs against it.

use crate::attrs;
use crate::scoped;
use async_trait::async_trait;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{PushCredential, PushCredentialRequest, PushCredentialType};
use mfa_provider_core::resource::get_str;
use mfa_provider_core::{
    Attribute, Block, DUMMY_SUPPRESS_VALUE, Diagnostic, Diagnostics, ErrorMapper, Outcome,
    RequestContext, Resource, Schema, StateUpgrader, Validator, default_create_read_retryable,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub const TYPE_NAME: &str = "application_push_credential";

const VARIANTS: &[&str] = &["fcm", "apns", "hms"];
const FCM_KEYS: &[&str] = &["key", "google_service_account_credentials"];

fn secret(name: &'static str) -> Attribute {
    Attribute::string(name)
        .required()
        .write_only()
        .validate(Validator::LengthAtLeast(1))
}

fn schema() -> Schema {
    Schema::with_block(
        1,
        Block::new(vec![
            Attribute::id(),
            Attribute::string("environment_id")
                .required()
                .force_new()
                .validate(Validator::ResourceId)
                .describe("The ID of the environment to create the application push notification credential in."),
            Attribute::string("application_id")
                .required()
                .force_new()
                .validate(Validator::ResourceId)
                .describe("The ID of the application to create the push notification credential for."),
            Attribute::object(
                "fcm",
                Block::new(vec![
                    Attribute::string("key")
                        .write_only()
                        .describe("Legacy server key of the Firebase Cloud Messaging service."),
                    Attribute::json("google_service_account_credentials")
                        .write_only()
                        .describe("Service account credentials of the Firebase Cloud Messaging service, as JSON."),
                ])
                .exactly_one_of(FCM_KEYS),
            )
            .replace_if_presence_changes()
            .describe("Credential settings for the Firebase Cloud Messaging service."),
            Attribute::object(
                "apns",
                Block::new(vec![
                    secret("key").describe("Identifier Apple uses for the authentication key."),
                    secret("team_id").describe("Identifier Apple uses for the team."),
                    secret("token_signing_key")
                        .describe("Token signing key (pkcs8 private key contents) used to connect to APNS."),
                ]),
            )
            .replace_if_presence_changes()
            .describe("Credential settings for the Apple Push Notification Service."),
            Attribute::object(
                "hms",
                Block::new(vec![
                    secret("client_id").describe("OAuth 2.0 Client ID from the Huawei Developers API console."),
                    secret("client_secret").describe("Client secret of the OAuth 2.0 Client ID."),
                ]),
            )
            .replace_if_presence_changes()
            .describe("Credential settings for Huawei Mobile Service push messaging."),
        ])
        .exactly_one_of(VARIANTS),
    )
    .describe("Resource to create and manage push credentials for a mobile MFA application.")
}

fn schema_v0() -> Schema {
    let sensitive = |name| Attribute::string(name).sensitive();
    Schema::new(
        0,
        vec![
            Attribute::id(),
            Attribute::string("environment_id").required(),
            Attribute::string("application_id").required(),
            Attribute::object_list(
                "fcm",
                Block::new(vec![
                    sensitive("key"),
                    sensitive("google_service_account_credentials"),
                ]),
            ),
            Attribute::object_list(
                "apns",
                Block::new(vec![
                    sensitive("key"),
                    Attribute::string("team_id"),
                    sensitive("token_signing_key"),
                ]),
            ),
            Attribute::object_list(
                "hms",
                Block::new(vec![sensitive("client_id"), sensitive("client_secret")]),
            ),
        ],
    )
}

/// Lists of at most one block become a single nullable object.
fn upgrade_v0(state: &Value) -> Result<Value, Diagnostics> {
    let variant = |name: &str, fields: &[&str]| -> Value {
        match attrs::items(state, name).first() {
            Some(block) => fields
                .iter()
                .map(|field| (field.to_string(), block.get(*field).cloned().unwrap_or(Value::Null)))
                .collect::<serde_json::Map<_, _>>()
                .into(),
            None => Value::Null,
        }
    };

    Ok(json!({
        "id": state.get("id"),
        "environment_id": state.get("environment_id"),
        "application_id": state.get("application_id"),
        "fcm": variant("fcm", FCM_KEYS),
        "apns": variant("apns", &["key", "team_id", "token_signing_key"]),
        "hms": variant("hms", &["client_id", "client_secret"]),
    }))
}

fn upgraders() -> Vec<StateUpgrader> {
    vec![StateUpgrader {
        prior_version: 0,
        prior_schema: schema_v0,
        upgrade: upgrade_v0,
    }]
}

fn invalid_combination() -> Diagnostics {
    Diagnostic::error(
        "Invalid Attribute Combination",
        format!(
            "Exactly one of these attributes must be configured: [{}]",
            VARIANTS.join(", ")
        ),
    )
    .into()
}

/// Select the request variant from the one configured block.
pub(crate) fn expand(plan: &Value) -> Result<PushCredentialRequest, Diagnostics> {
    let configured: Vec<&str> = VARIANTS
        .iter()
        .copied()
        .filter(|name| attrs::object(plan, name).is_some())
        .collect();
    let [variant] = configured.as_slice() else {
        return Err(invalid_combination());
    };
    let Some(block) = attrs::object(plan, variant) else {
        return Err(invalid_combination());
    };

    let field = |name: &str| {
        attrs::non_empty(block, name).ok_or_else(|| {
            Diagnostics::from(
                Diagnostic::error(
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", name),
                )
                .at(format!("{}.{}", variant, name)),
            )
        })
    };

    match *variant {
        "fcm" => match attrs::non_empty(block, "key") {
            Some(key) => Ok(PushCredentialRequest::Fcm { key }),
            None => Ok(PushCredentialRequest::FcmHttpV1 {
                google_service_account_credentials: field("google_service_account_credentials")?,
            }),
        },
        "apns" => Ok(PushCredentialRequest::Apns {
            key: field("key")?,
            team_id: field("team_id")?,
            token_signing_key: field("token_signing_key")?,
        }),
        _ => Ok(PushCredentialRequest::Hms {
            client_id: field("client_id")?,
            client_secret: field("client_secret")?,
        }),
    }
}

/// State for a credential. Only the type comes back, so every secret of
/// that variant holds the placeholder.
pub(crate) fn flatten(
    environment_id: &str,
    application_id: &str,
    credential: &PushCredential,
) -> Value {
    let mut state = json!({
        "id": credential.id,
        "environment_id": environment_id,
        "application_id": application_id,
        "fcm": null,
        "apns": null,
        "hms": null,
    });

    let dummy = DUMMY_SUPPRESS_VALUE;
    match credential.credential_type {
        PushCredentialType::Fcm => {
            state["fcm"] = json!({ "key": dummy, "google_service_account_credentials": null });
        }
        PushCredentialType::FcmHttpV1 => {
            state["fcm"] = json!({ "key": null, "google_service_account_credentials": dummy });
        }
        PushCredentialType::Apns => {
            state["apns"] = json!({ "key": dummy, "team_id": dummy, "token_signing_key": dummy });
        }
        PushCredentialType::Hms => {
            state["hms"] = json!({ "client_id": dummy, "client_secret": dummy });
        }
    }
    state
}

#[derive(Clone, Copy)]
struct Ids<'a> {
    environment_id: &'a str,
    application_id: &'a str,
}

fn parent_ids(value: &Value) -> Result<Ids<'_>, Outcome> {
    match (get_str(value, "environment_id"), get_str(value, "application_id")) {
        (Some(environment_id), Some(application_id)) => Ok(Ids {
            environment_id,
            application_id,
        }),
        _ => Err(Outcome::failed(Diagnostic::internal(
            "The push credential is missing its environment or application ID.",
        ))),
    }
}

fn credential_id(value: &Value) -> Result<&str, Outcome> {
    get_str(value, "id").ok_or_else(|| {
        Outcome::failed(Diagnostic::internal("The push credential ID is not set."))
    })
}

fn locate<'a>(parent: &'a Value, own: &'a Value) -> Result<(Ids<'a>, &'a str), Outcome> {
    Ok((parent_ids(parent)?, credential_id(own)?))
}

pub struct PushCredentialResource {
    api: Arc<dyn MfaApi>,
}

impl PushCredentialResource {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self { api }
    }

    async fn read_by_id(&self, ctx: &RequestContext, ids: &Ids<'_>, id: &str) -> Outcome {
        let api = self.api.as_ref();
        let Ids {
            environment_id,
            application_id,
        } = *ids;

        let (credential, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "ReadOneMFAPushCredential",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_create_read_retryable),
            move || api.read_push_credential(ctx, environment_id, application_id, id),
        )
        .await;

        match credential {
            _ if diags.has_error() => Outcome::failed(diags),
            Some(credential) => Outcome::with_diagnostics(
                Some(flatten(environment_id, application_id, &credential)),
                diags,
            ),
            None => Outcome::removed(diags),
        }
    }
}

#[async_trait]
impl Resource for PushCredentialResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn import_format(&self) -> Option<&'static str> {
        Some("environmentID/applicationID/pushCredentialID")
    }

    fn import_attributes(&self, components: &[String]) -> Value {
        json!({
            "environment_id": components.first(),
            "application_id": components.get(1),
            "id": components.get(2),
        })
    }

    fn upgraders(&self) -> Vec<StateUpgrader> {
        upgraders()
    }

    async fn create(&self, ctx: &RequestContext, plan: &Value) -> Outcome {
        let api = self.api.as_ref();
        let ids = match parent_ids(plan) {
            Ok(ids) => ids,
            Err(outcome) => return outcome,
        };
        let request = match expand(plan) {
            Ok(request) => request,
            Err(diags) => return Outcome::failed(diags),
        };
        let Ids {
            environment_id,
            application_id,
        } = ids;
        let request = &request;

        let (created, mut diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "CreateMFAPushCredential",
            ErrorMapper::Default,
            Some(default_create_read_retryable),
            move || api.create_push_credential(ctx, environment_id, application_id, request),
        )
        .await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }
        let Some(created) = created else {
            diags.push(Diagnostic::internal(
                "The service returned no push credential for the create request.",
            ));
            return Outcome::failed(diags);
        };

        info!(
            environment_id,
            application_id,
            id = %created.id,
            credential_type = %created.credential_type,
            "Push credential created"
        );
        self.read_by_id(ctx, &ids, &created.id).await.after(diags)
    }

    async fn read(&self, ctx: &RequestContext, state: &Value) -> Outcome {
        let (ids, id) = match locate(state, state) {
            Ok(found) => found,
            Err(outcome) => return outcome,
        };
        self.read_by_id(ctx, &ids, id).await
    }

    async fn update(&self, ctx: &RequestContext, plan: &Value, prior: &Value) -> Outcome {
        let api = self.api.as_ref();
        let (ids, id) = match locate(plan, prior) {
            Ok(found) => found,
            Err(outcome) => return outcome,
        };
        let request = match expand(plan) {
            Ok(request) => request,
            Err(diags) => return Outcome::failed(diags),
        };
        let Ids {
            environment_id,
            application_id,
        } = ids;
        let request = &request;

        let (_, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "UpdateMFAPushCredential",
            ErrorMapper::Default,
            Some(default_create_read_retryable),
            move || api.update_push_credential(ctx, environment_id, application_id, id, request),
        )
        .await;
        if diags.has_error() {
            return Outcome::failed(diags);
        }

        self.read_by_id(ctx, &ids, id).await.after(diags)
    }

    async fn delete(&self, ctx: &RequestContext, state: &Value) -> Diagnostics {
        let api = self.api.as_ref();
        let (ids, id) = match locate(state, state) {
            Ok(found) => found,
            Err(outcome) => return outcome.diagnostics,
        };
        let Ids {
            environment_id,
            application_id,
        } = ids;

        let (_, diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "DeleteMFAPushCredential",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_create_read_retryable),
            move || api.delete_push_credential(ctx, environment_id, application_id, id),
        )
        .await;
        diags
    }
}
