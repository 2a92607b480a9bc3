//! FIDO2 policy models

use super::ObjectRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEligibility {
    pub allow: bool,
    pub enforce_during_authentication: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MdsAuthenticatorsRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_authenticators: Option<Vec<ObjectRef>>,

    pub enforce_during_authentication: bool,

    pub option: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAttribute {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNameAttribute {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_attributes: Option<Vec<SubAttribute>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDisplayNameAttributes {
    #[serde(default)]
    pub attributes: Vec<DisplayNameAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresenceTimeout {
    pub duration: i64,
    pub time_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVerification {
    pub enforce_during_authentication: bool,
    pub option: String,
}

/// A FIDO2 policy. The API replaces the whole object on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fido2Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing)]
    pub environment: Option<ObjectRef>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,

    pub attestation_requirements: String,

    pub authenticator_attachment: String,

    pub backup_eligibility: BackupEligibility,

    pub device_display_name: String,

    pub discoverable_credentials: String,

    pub mds_authenticators_requirements: MdsAuthenticatorsRequirements,

    pub relying_party_id: String,

    pub user_display_name_attributes: UserDisplayNameAttributes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_presence_timeout: Option<UserPresenceTimeout>,

    pub user_verification: UserVerification,
}
