//! Application push credential models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Push credential request, one variant per push service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PushCredentialRequest {
    /// Firebase Cloud Messaging, legacy server key
    #[serde(rename = "FCM")]
    Fcm { key: String },

    /// Firebase Cloud Messaging HTTP v1, service account JSON
    #[serde(rename = "FCM_HTTP_V1", rename_all = "camelCase")]
    FcmHttpV1 {
        google_service_account_credentials: String,
    },

    #[serde(rename = "APNS", rename_all = "camelCase")]
    Apns {
        key: String,
        team_id: String,
        token_signing_key: String,
    },

    #[serde(rename = "HMS", rename_all = "camelCase")]
    Hms {
        client_id: String,
        client_secret: String,
    },
}

impl PushCredentialRequest {
    pub fn credential_type(&self) -> PushCredentialType {
        match self {
            PushCredentialRequest::Fcm { .. } => PushCredentialType::Fcm,
            PushCredentialRequest::FcmHttpV1 { .. } => PushCredentialType::FcmHttpV1,
            PushCredentialRequest::Apns { .. } => PushCredentialType::Apns,
            PushCredentialRequest::Hms { .. } => PushCredentialType::Hms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushCredentialType {
    #[serde(rename = "FCM")]
    Fcm,
    #[serde(rename = "FCM_HTTP_V1")]
    FcmHttpV1,
    #[serde(rename = "APNS")]
    Apns,
    #[serde(rename = "HMS")]
    Hms,
}

impl fmt::Display for PushCredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PushCredentialType::Fcm => "FCM",
            PushCredentialType::FcmHttpV1 => "FCM_HTTP_V1",
            PushCredentialType::Apns => "APNS",
            PushCredentialType::Hms => "HMS",
        };
        write!(f, "{}", name)
    }
}

/// Push credential as returned by the service. Secrets are never echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushCredential {
    pub id: String,

    #[serde(rename = "type")]
    pub credential_type: PushCredentialType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_is_tagged_by_type() {
        let apns = PushCredentialRequest::Apns {
            key: "K".into(),
            team_id: "T".into(),
            token_signing_key: "S".into(),
        };
        assert_eq!(
            serde_json::to_value(&apns).unwrap(),
            json!({ "type": "APNS", "key": "K", "teamId": "T", "tokenSigningKey": "S" })
        );

        let v1 = PushCredentialRequest::FcmHttpV1 {
            google_service_account_credentials: "{}".into(),
        };
        assert_eq!(
            serde_json::to_value(&v1).unwrap(),
            json!({ "type": "FCM_HTTP_V1", "googleServiceAccountCredentials": "{}" })
        );
    }

    #[test]
    fn test_response_type_decodes() {
        let cred: PushCredential =
            serde_json::from_value(json!({ "id": "c-1", "type": "HMS" })).unwrap();
        assert_eq!(cred.credential_type, PushCredentialType::Hms);
        assert_eq!(cred.credential_type.to_string(), "HMS");
    }
}
