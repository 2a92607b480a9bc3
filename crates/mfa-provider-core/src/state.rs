//! Resource state envelope
//!
//! The host owns persistence; this is the shape exchanged with it. The
//! attributes follow the resource schema of `schema_version`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State of a single managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type (e.g. `mfa_settings`)
    pub resource_type: String,

    /// Schema version the attributes were written with
    #[serde(default)]
    pub schema_version: u64,

    /// Resource ID. Empty once the resource is known to be gone.
    pub id: String,

    /// Attribute values
    pub attributes: Value,

    /// Last time the plugin wrote this state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResourceState {
    pub fn new(
        resource_type: impl Into<String>,
        schema_version: u64,
        id: impl Into<String>,
        attributes: Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            schema_version,
            id: id.into(),
            attributes,
            updated_at: Some(Utc::now()),
        }
    }

    pub fn is_removed(&self) -> bool {
        self.id.is_empty()
    }

    /// Clear the ID, leaving the attributes untouched
    pub fn mark_removed(&mut self) {
        self.id.clear();
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Value::as_str)
    }
}
