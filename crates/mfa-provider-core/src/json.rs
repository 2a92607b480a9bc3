//! Normalized JSON string values
//!
//! Attributes holding JSON documents (service-account credentials) compare by
//! meaning, not by formatting: key order and whitespace are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedJson(String);

impl NormalizedJson {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn parse(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.0)
    }

    pub fn is_valid(&self) -> bool {
        self.parse().is_ok()
    }

    /// Semantic equality. Invalid documents only equal byte-identical strings.
    pub fn semantically_equals(&self, other: &NormalizedJson) -> bool {
        semantically_equal(&self.0, &other.0)
    }
}

impl PartialEq for NormalizedJson {
    fn eq(&self, other: &Self) -> bool {
        self.semantically_equals(other)
    }
}

impl fmt::Display for NormalizedJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NormalizedJson {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

pub fn semantically_equal(a: &str, b: &str) -> bool {
    match (
        serde_json::from_str::<Value>(a),
        serde_json::from_str::<Value>(b),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
