//! API response → state
//!
//! Fields the response leaves out become null in state.

use mfa_provider_client::models::{
    DeviceAuthenticationPolicy, Fido2Device, FidoDevice, MobileApplication, MobileDevice,
    OfflineDevice, OtpFailure, TimePeriod, TotpDevice,
};
use serde_json::{Value, json};

pub(crate) fn flatten(
    environment_id: &str,
    id: &str,
    policy: &DeviceAuthenticationPolicy,
) -> Value {
    json!({
        "id": policy.id.as_deref().unwrap_or(id),
        "environment_id": environment_id,
        "name": policy.name,
        "device_selection": policy.authentication.as_ref().map(|a| a.device_selection.clone()),
        "new_device_notification": policy.new_device_notification,
        "sms": policy.sms.as_ref().map(offline_device),
        "voice": policy.voice.as_ref().map(offline_device),
        "email": policy.email.as_ref().map(offline_device),
        "mobile": policy.mobile.as_ref().map(mobile_device),
        "totp": policy.totp.as_ref().map(totp_device),
        "fido2": policy.fido2.as_ref().map(fido2_device),
        "security_key": policy.security_key.as_ref().map(fido_device),
        "platform": policy.platform.as_ref().map(fido_device),
    })
}

fn duration(period: Option<&TimePeriod>) -> Option<i64> {
    period.map(|p| p.duration)
}

fn unit(period: Option<&TimePeriod>) -> Option<&str> {
    period.map(|p| p.time_unit.as_str())
}

/// `otp_failure_*` attributes, merged into `item`
fn otp_failure(item: &mut Value, failure: Option<&OtpFailure>) {
    let cool_down = failure.and_then(|f| f.cool_down.as_ref());
    item["otp_failure_count"] = json!(failure.and_then(|f| f.count));
    item["otp_failure_cooldown_duration"] = json!(duration(cool_down));
    item["otp_failure_cooldown_timeunit"] = json!(unit(cool_down));
}

fn offline_device(device: &OfflineDevice) -> Value {
    let otp = device.otp.as_ref();
    let life_time = otp.and_then(|o| o.life_time.as_ref());

    let mut item = json!({
        "enabled": device.enabled,
        "pairing_disabled": device.pairing_disabled,
        "otp_lifetime_duration": duration(life_time),
        "otp_lifetime_timeunit": unit(life_time),
    });
    otp_failure(&mut item, otp.and_then(|o| o.failure.as_ref()));
    item
}

fn mobile_device(device: &MobileDevice) -> Value {
    let mut item = json!({ "enabled": device.enabled });
    otp_failure(
        &mut item,
        device.otp.as_ref().and_then(|o| o.failure.as_ref()),
    );
    item["application"] = json!(
        device
            .applications
            .as_ref()
            .map(|apps| apps.iter().map(mobile_application).collect::<Vec<_>>())
    );
    item
}

fn mobile_application(app: &MobileApplication) -> Value {
    let push_limit = app.push_limit.as_ref();
    let lock = push_limit.and_then(|l| l.lock_duration.as_ref());
    let period = push_limit.and_then(|l| l.time_period.as_ref());
    let authorization = app.device_authorization.as_ref();

    json!({
        "id": app.id,
        "pairing_disabled": app.pairing_disabled,
        "push_enabled": app.push.enabled,
        "otp_enabled": app.otp.enabled,
        "push_timeout_duration": duration(app.push_timeout.as_ref()),
        "push_timeout_timeunit": unit(app.push_timeout.as_ref()),
        "pairing_key_lifetime_duration": duration(app.pairing_key_lifetime.as_ref()),
        "pairing_key_lifetime_timeunit": unit(app.pairing_key_lifetime.as_ref()),
        "push_limit_count": push_limit.and_then(|l| l.count),
        "push_limit_lock_duration": duration(lock),
        "push_limit_lock_duration_timeunit": unit(lock),
        "push_limit_time_period_duration": duration(period),
        "push_limit_time_period_timeunit": unit(period),
        "device_authorization_enabled": authorization.map(|a| a.enabled),
        "device_authorization_extra_verification": authorization.and_then(|a| a.extra_verification.clone()),
        "auto_enrollment_enabled": app.auto_enrollment.map(|a| a.enabled),
        "integrity_detection": app.integrity_detection,
    })
}

fn totp_device(device: &TotpDevice) -> Value {
    let mut item = json!({
        "enabled": device.enabled,
        "pairing_disabled": device.pairing_disabled,
    });
    otp_failure(
        &mut item,
        device.otp.as_ref().and_then(|o| o.failure.as_ref()),
    );
    item
}

fn fido2_device(device: &Fido2Device) -> Value {
    json!({
        "enabled": device.enabled,
        "pairing_disabled": device.pairing_disabled,
        "fido2_policy_id": device.fido2_policy_id.as_deref().filter(|id| !id.is_empty()),
    })
}

fn fido_device(device: &FidoDevice) -> Value {
    json!({
        "enabled": device.enabled,
        "pairing_disabled": device.pairing_disabled,
        "fido_policy_id": device.fido_policy_id,
    })
}
