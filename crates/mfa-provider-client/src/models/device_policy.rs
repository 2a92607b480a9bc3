//! Device authentication policy models

use serde::{Deserialize, Serialize};

/// A duration with its unit, e.g. `{"duration": 30, "timeUnit": "MINUTES"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriod {
    pub duration: i64,
    pub time_unit: String,
}

impl TimePeriod {
    pub fn new(duration: i64, time_unit: impl Into<String>) -> Self {
        Self {
            duration,
            time_unit: time_unit.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnabledFlag {
    #[serde(default)]
    pub enabled: bool,
}

impl EnabledFlag {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cool_down: Option<TimePeriod>,
}

/// OTP settings of SMS, voice and email devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineOtp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_time: Option<TimePeriod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<OtpFailure>,
}

/// OTP settings of mobile and TOTP devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureOtp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<OtpFailure>,
}

/// SMS, voice or email device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineDevice {
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<OfflineOtp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_duration: Option<TimePeriod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthorization {
    #[serde(default)]
    pub enabled: bool,

    /// `permissive` or `restrictive`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_verification: Option<String>,
}

/// A native application the mobile device settings apply to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileApplication {
    pub id: String,

    #[serde(default)]
    pub push: EnabledFlag,

    #[serde(default)]
    pub otp: EnabledFlag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_timeout: Option<TimePeriod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_key_lifetime: Option<TimePeriod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_limit: Option<PushLimit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_authorization: Option<DeviceAuthorization>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_enrollment: Option<EnabledFlag>,

    /// `permissive` or `restrictive`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_detection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDevice {
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<FailureOtp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<MobileApplication>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpDevice {
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<FailureOtp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fido2Device {
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fido2_policy_id: Option<String>,
}

/// Legacy security key or platform authenticator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FidoDevice {
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fido_policy_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationSettings {
    pub device_selection: String,
}

/// Device authentication policy, used for both requests and responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthenticationPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<OfflineDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<OfflineDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<OfflineDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<MobileDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp: Option<TotpDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fido2: Option<Fido2Device>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_key: Option<FidoDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<FidoDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_device_notification: Option<String>,

    /// Always false for policies managed here
    #[serde(default)]
    pub for_sign_on_policy: bool,

    #[serde(default)]
    pub default: bool,
}
