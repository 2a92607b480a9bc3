//! Environment MFA settings models

use super::ObjectRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pairing {
    pub max_allowed_devices: i64,
    pub pairing_key_format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockout {
    pub failure_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhoneExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfa_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSettings {
    pub pairing: Pairing,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockout: Option<Lockout>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_extensions: Option<PhoneExtensions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<UserSettings>,

    /// Read-only
    #[serde(default, skip_serializing)]
    pub environment: Option<ObjectRef>,

    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}
