//! Plan → API request

use crate::attrs;
use mfa_provider_client::models::{
    AuthenticationSettings, DeviceAuthenticationPolicy, DeviceAuthorization, EnabledFlag,
    FailureOtp, Fido2Device, FidoDevice, MobileApplication, MobileDevice, OfflineDevice,
    OfflineOtp, OtpFailure, PushLimit, TimePeriod, TotpDevice,
};
use mfa_provider_core::{Diagnostic, Diagnostics};
use serde_json::Value;

/// Push timeouts are always expressed in seconds
pub(crate) const PUSH_TIMEOUT_UNIT: &str = "SECONDS";

/// Build the full policy document. Every call sends the complete policy.
pub(crate) fn expand(plan: &Value) -> Result<DeviceAuthenticationPolicy, Diagnostics> {
    let required = |name: &str| {
        attrs::object(plan, name).ok_or_else(|| {
            Diagnostics::from(Diagnostic::internal(format!(
                "The `{}` block is missing from the planned MFA policy.",
                name
            )))
        })
    };

    Ok(DeviceAuthenticationPolicy {
        id: None,
        name: attrs::string(plan, "name").unwrap_or_default(),
        sms: Some(offline_device(required("sms")?)),
        voice: Some(offline_device(required("voice")?)),
        email: Some(offline_device(required("email")?)),
        mobile: Some(mobile_device(required("mobile")?)),
        totp: Some(totp_device(required("totp")?)),
        fido2: attrs::object(plan, "fido2").map(fido2_device),
        security_key: attrs::object(plan, "security_key").map(fido_device),
        platform: attrs::object(plan, "platform").map(fido_device),
        authentication: attrs::string(plan, "device_selection")
            .map(|device_selection| AuthenticationSettings { device_selection }),
        new_device_notification: attrs::string(plan, "new_device_notification"),
        for_sign_on_policy: false,
        default: false,
    })
}

fn otp_failure(block: &Value) -> OtpFailure {
    OtpFailure {
        count: attrs::int(block, "otp_failure_count"),
        cool_down: attrs::time_period(
            block,
            "otp_failure_cooldown_duration",
            "otp_failure_cooldown_timeunit",
        ),
    }
}

fn enabled(block: &Value) -> bool {
    attrs::boolean(block, "enabled").unwrap_or(false)
}

fn offline_device(block: &Value) -> OfflineDevice {
    OfflineDevice {
        enabled: enabled(block),
        pairing_disabled: attrs::boolean(block, "pairing_disabled"),
        otp: Some(OfflineOtp {
            life_time: attrs::time_period(block, "otp_lifetime_duration", "otp_lifetime_timeunit"),
            failure: Some(otp_failure(block)),
        }),
    }
}

fn mobile_device(block: &Value) -> MobileDevice {
    let applications: Vec<MobileApplication> = attrs::items(block, "application")
        .iter()
        .map(mobile_application)
        .collect();

    MobileDevice {
        enabled: enabled(block),
        otp: Some(FailureOtp {
            failure: Some(otp_failure(block)),
        }),
        applications: (!applications.is_empty()).then_some(applications),
    }
}

pub(crate) fn mobile_application(app: &Value) -> MobileApplication {
    MobileApplication {
        id: attrs::string(app, "id").unwrap_or_default(),
        push: EnabledFlag::new(attrs::boolean(app, "push_enabled").unwrap_or(false)),
        otp: EnabledFlag::new(attrs::boolean(app, "otp_enabled").unwrap_or(false)),
        pairing_disabled: attrs::boolean(app, "pairing_disabled"),
        push_timeout: attrs::int(app, "push_timeout_duration")
            .map(|duration| TimePeriod::new(duration, PUSH_TIMEOUT_UNIT)),
        pairing_key_lifetime: attrs::time_period(
            app,
            "pairing_key_lifetime_duration",
            "pairing_key_lifetime_timeunit",
        ),
        push_limit: Some(PushLimit {
            count: attrs::int(app, "push_limit_count"),
            lock_duration: attrs::time_period(
                app,
                "push_limit_lock_duration",
                "push_limit_lock_duration_timeunit",
            ),
            time_period: attrs::time_period(
                app,
                "push_limit_time_period_duration",
                "push_limit_time_period_timeunit",
            ),
        }),
        device_authorization: Some(DeviceAuthorization {
            enabled: attrs::boolean(app, "device_authorization_enabled").unwrap_or(false),
            extra_verification: attrs::non_empty(app, "device_authorization_extra_verification"),
        }),
        auto_enrollment: attrs::boolean(app, "auto_enrollment_enabled").map(EnabledFlag::new),
        integrity_detection: attrs::non_empty(app, "integrity_detection"),
    }
}

fn totp_device(block: &Value) -> TotpDevice {
    TotpDevice {
        enabled: enabled(block),
        pairing_disabled: attrs::boolean(block, "pairing_disabled"),
        otp: Some(FailureOtp {
            failure: Some(otp_failure(block)),
        }),
    }
}

fn fido2_device(block: &Value) -> Fido2Device {
    Fido2Device {
        enabled: enabled(block),
        pairing_disabled: attrs::boolean(block, "pairing_disabled"),
        fido2_policy_id: attrs::non_empty(block, "fido2_policy_id"),
    }
}

fn fido_device(block: &Value) -> FidoDevice {
    FidoDevice {
        enabled: enabled(block),
        pairing_disabled: attrs::boolean(block, "pairing_disabled"),
        fido_policy_id: attrs::non_empty(block, "fido_policy_id"),
    }
}
