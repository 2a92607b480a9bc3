//! Mobile application pre-flight
//!
//! Each application referenced from `mobile.application` must be a native
//! OIDC application with mobile settings, and the policy's integrity
//! detection level must agree with the application's own setting.

use crate::attrs;
use crate::scoped;
use mfa_provider_client::MfaApi;
use mfa_provider_client::models::{Application, ApplicationMobile};
use mfa_provider_core::{
    Diagnostic, Diagnostics, ErrorMapper, RequestContext, default_create_read_retryable,
};
use serde_json::Value;

const NOT_NATIVE_DETAIL: &str = "To configure a mobile application in PingOne, the application must be an OIDC application of type `Native`, with a package or bundle set.";

pub(crate) async fn check_mobile_applications(
    api: &dyn MfaApi,
    ctx: &RequestContext,
    environment_id: &str,
    plan: &Value,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(mobile) = attrs::object(plan, "mobile") else {
        return diags;
    };

    for app in attrs::items(mobile, "application") {
        let Some(application_id) = attrs::string(app, "id") else {
            continue;
        };
        let application_id = application_id.as_str();

        let (application, read_diags) = scoped::call(
            api,
            ctx,
            environment_id,
            "ReadOneApplication",
            ErrorMapper::ResourceNotFoundWarning,
            Some(default_create_read_retryable),
            move || api.read_application(ctx, environment_id, application_id),
        )
        .await;
        diags.append(read_diags);
        if diags.has_error() {
            return diags;
        }

        let checked = check_application(application.as_ref()).and_then(|mobile| {
            check_integrity_detection(mobile, attrs::non_empty(app, "integrity_detection").as_deref())
        });
        if let Err(diag) = checked {
            diags.push(diag);
            return diags;
        }
    }

    diags
}

/// The application's mobile settings, when it can host the mobile authenticator
pub(crate) fn check_application(
    application: Option<&Application>,
) -> Result<&ApplicationMobile, Diagnostic> {
    let Some(application) = application else {
        return Err(Diagnostic::error(
            "Application referenced in `mobile.application.id` does not exist",
            "",
        ));
    };

    if !application.is_oidc() {
        return Err(Diagnostic::error(
            "Application referenced in `mobile.application.id` is not of type OIDC",
            NOT_NATIVE_DETAIL,
        ));
    }

    if !application.is_native() {
        return Err(Diagnostic::error(
            "Application referenced in `mobile.application.id` is OIDC, but is not the required `Native` OIDC application type",
            NOT_NATIVE_DETAIL,
        ));
    }

    match &application.mobile {
        Some(mobile) if mobile.bundle_id.is_some() || mobile.package_name.is_some() => Ok(mobile),
        _ => Err(Diagnostic::error(
            "Application referenced in `mobile.application.id` does not contain mobile application configuration",
            NOT_NATIVE_DETAIL,
        )),
    }
}

pub(crate) fn check_integrity_detection(
    mobile: &ApplicationMobile,
    configured: Option<&str>,
) -> Result<(), Diagnostic> {
    match (mobile.integrity_detection_enabled(), configured) {
        (true, None) => Err(Diagnostic::error(
            "Integrity detection (`mobile.application.integrity_detection`) must be set when the Application resource has integrity detection enabled",
            "The referenced mobile application (`mobile.application.id`) has integrity detection enabled. This policy must specify the level of integrity detection in the `mobile.application.integrity_detection` parameter.",
        )),
        (false, Some(_)) => Err(Diagnostic::error(
            "Integrity detection (`mobile.application.integrity_detection`) has no effect when the Application resource has integrity detection disabled",
            "The referenced mobile application (`mobile.application.id`) has integrity detection disabled. Setting the `mobile.application.integrity_detection` parameter has no effect.",
        )),
        _ => Ok(()),
    }
}
