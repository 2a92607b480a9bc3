//! Typed access to plan and state attribute values
//!
//! Null and absent attributes both read as `None`.

use mfa_provider_client::models::TimePeriod;
use serde_json::Value;

pub(crate) fn string(object: &Value, name: &str) -> Option<String> {
    object.get(name).and_then(Value::as_str).map(str::to_string)
}

/// Like [`string`], with the empty string treated as unset
pub(crate) fn non_empty(object: &Value, name: &str) -> Option<String> {
    string(object, name).filter(|s| !s.is_empty())
}

pub(crate) fn boolean(object: &Value, name: &str) -> Option<bool> {
    object.get(name).and_then(Value::as_bool)
}

pub(crate) fn int(object: &Value, name: &str) -> Option<i64> {
    object.get(name).and_then(Value::as_i64)
}

/// Nested object attribute, `None` when null
pub(crate) fn object<'a>(object: &'a Value, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|v| v.is_object())
}

/// Elements of a list or set attribute, empty when null
pub(crate) fn items<'a>(object: &'a Value, name: &str) -> &'a [Value] {
    object
        .get(name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// A duration/unit attribute pair. Both halves must be set.
pub(crate) fn time_period(object: &Value, duration: &str, unit: &str) -> Option<TimePeriod> {
    Some(TimePeriod::new(int(object, duration)?, string(object, unit)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_reads_as_none() {
        let value = json!({ "name": null, "count": 3, "empty": "" });
        assert_eq!(string(&value, "name"), None);
        assert_eq!(string(&value, "missing"), None);
        assert_eq!(int(&value, "count"), Some(3));
        assert_eq!(string(&value, "empty").as_deref(), Some(""));
        assert_eq!(non_empty(&value, "empty"), None);
    }

    #[test]
    fn test_time_period_needs_both_halves() {
        let value = json!({ "d": 30, "u": "MINUTES", "lonely": 5 });
        assert_eq!(time_period(&value, "d", "u"), Some(TimePeriod::new(30, "MINUTES")));
        assert_eq!(time_period(&value, "lonely", "nope"), None);
    }

    #[test]
    fn test_items_of_null_is_empty() {
        assert!(items(&json!({ "application": null }), "application").is_empty());
        assert_eq!(items(&json!({ "ids": ["a", "b"] }), "ids").len(), 2);
    }
}
