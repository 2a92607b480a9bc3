//! Legacy FIDO policy models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedAuthenticator {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FidoPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub attestation_requirements: String,

    pub resident_key_requirement: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_authenticators: Option<Vec<AllowedAuthenticator>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_during_authentication: Option<bool>,

    /// Read-only
    #[serde(default, skip_serializing)]
    pub default: Option<bool>,
}
