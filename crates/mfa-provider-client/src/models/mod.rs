//! API models

pub mod device_policy;
pub mod environment;
pub mod fido2_policy;
pub mod fido_policy;
pub mod mfa_settings;
pub mod migrate;
pub mod push_credential;

pub use device_policy::*;
pub use environment::{Application, ApplicationMobile, Environment, IntegrityDetection};
pub use fido2_policy::{
    BackupEligibility, DisplayNameAttribute, Fido2Policy, MdsAuthenticatorsRequirements,
    SubAttribute, UserDisplayNameAttributes, UserPresenceTimeout, UserVerification,
};
pub use fido_policy::{AllowedAuthenticator, FidoPolicy};
pub use mfa_settings::{Lockout, MfaSettings, Pairing, PhoneExtensions, UserSettings};
pub use migrate::{MIGRATE_CONTENT_TYPE, MigrateData, MigrateRequest};
pub use push_credential::{PushCredential, PushCredentialRequest, PushCredentialType};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reference to another object by ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Collection envelope: `{"_embedded": {"<name>": [...]}, "_links": {"next": {...}}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityArray<T> {
    #[serde(rename = "_embedded", default = "HashMap::new")]
    pub embedded: HashMap<String, Vec<T>>,

    #[serde(rename = "_links", default = "HashMap::new")]
    pub links: HashMap<String, Link>,
}

impl<T> EntityArray<T> {
    /// Items under `name`, empty when the collection is absent
    pub fn take(&mut self, name: &str) -> Vec<T> {
        self.embedded.remove(name).unwrap_or_default()
    }

    pub fn next_href(&self) -> Option<String> {
        self.links.get("next").map(|link| link.href.clone())
    }
}
