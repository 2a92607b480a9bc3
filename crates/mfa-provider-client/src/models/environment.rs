//! Environment and application models, read for existence and pre-flight checks

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityDetection {
    /// `ENABLED` or `DISABLED`
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMobile {
    #[serde(default)]
    pub bundle_id: Option<String>,

    #[serde(default)]
    pub package_name: Option<String>,

    #[serde(default)]
    pub integrity_detection: Option<IntegrityDetection>,
}

impl ApplicationMobile {
    pub fn integrity_detection_enabled(&self) -> bool {
        self.integrity_detection
            .as_ref()
            .and_then(|d| d.mode.as_deref())
            == Some("ENABLED")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// `OPENID_CONNECT`, `SAML`, `WS_FED`, ...
    pub protocol: String,

    /// `NATIVE_APP`, `CUSTOM_APP`, `WEB_APP`, ...
    #[serde(rename = "type")]
    pub application_type: String,

    #[serde(default)]
    pub mobile: Option<ApplicationMobile>,
}

impl Application {
    pub fn is_oidc(&self) -> bool {
        self.protocol == "OPENID_CONNECT"
    }

    pub fn is_native(&self) -> bool {
        matches!(self.application_type.as_str(), "NATIVE_APP" | "CUSTOM_APP")
    }
}
