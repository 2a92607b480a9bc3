//! Bulk FIDO2 migration of device policies

use serde::{Deserialize, Serialize};

/// Content type selecting the migration operation on the policy collection
pub const MIGRATE_CONTENT_TYPE: &str =
    "application/vnd.pingidentity.deviceAuthenticationPolicy.fido2.migrate+json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateData {
    pub device_authentication_policy_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fido2_policy_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateRequest {
    pub migrate_data: Vec<MigrateData>,
}
