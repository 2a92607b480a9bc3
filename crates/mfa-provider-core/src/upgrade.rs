//! Schema-version upgrades of stored state
//!
//! Each upgrader moves attributes from `prior_version` to `prior_version + 1`.
//! Upgraders are applied in ascending order, so a resource at version N must
//! register one upgrader for every version below N.

use crate::diag::{Diagnostic, Diagnostics};
use crate::error::{ProviderError, Result};
use crate::schema::Schema;
use crate::state::ResourceState;
use serde_json::Value;
use tracing::info;

pub type UpgradeFn = fn(&Value) -> std::result::Result<Value, Diagnostics>;

#[derive(Debug, Clone)]
pub struct StateUpgrader {
    pub prior_version: u64,

    /// Schema of the stored state at `prior_version`
    pub prior_schema: fn() -> Schema,

    pub upgrade: UpgradeFn,
}

/// Fail unless every version below `current_version` has an upgrader.
pub fn check_upgraders(
    resource_type: &str,
    current_version: u64,
    upgraders: &[StateUpgrader],
) -> Result<()> {
    for version in 0..current_version {
        if !upgraders.iter().any(|u| u.prior_version == version) {
            return Err(ProviderError::MissingUpgrader {
                resource_type: resource_type.to_string(),
                version,
            });
        }
    }
    Ok(())
}

/// Bring `state` up to `current.version`.
///
/// Every diagnostic raised on this path is fatal.
pub fn upgrade_state(
    current: &Schema,
    upgraders: &[StateUpgrader],
    state: &ResourceState,
) -> std::result::Result<ResourceState, Diagnostics> {
    if state.schema_version == current.version {
        return Ok(state.clone());
    }

    if state.schema_version > current.version {
        let err = ProviderError::UnsupportedStateVersion {
            resource_type: state.resource_type.clone(),
            found: state.schema_version,
            supported: current.version,
        };
        return Err(Diagnostic::error("Unable to upgrade resource state", err.to_string()).into());
    }

    check_upgraders(&state.resource_type, current.version, upgraders)
        .map_err(|err| Diagnostic::internal(err.to_string()))?;

    let mut attributes = state.attributes.clone();
    for version in state.schema_version..current.version {
        let upgrader = upgraders
            .iter()
            .find(|u| u.prior_version == version)
            .ok_or_else(|| Diagnostic::internal(format!("No upgrader for version {}.", version)))?;

        let prior_schema = (upgrader.prior_schema)();
        let diags = prior_schema.check_state(&attributes);
        if diags.has_error() {
            return Err(diags);
        }

        attributes = (upgrader.upgrade)(&attributes)?;
        info!(
            resource_type = %state.resource_type,
            from = version,
            to = version + 1,
            "Upgraded resource state"
        );
    }

    let diags = current.check_state(&attributes);
    if diags.has_error() {
        return Err(diags);
    }

    let mut upgraded = state.clone();
    upgraded.schema_version = current.version;
    upgraded.attributes = attributes;
    upgraded.touch();
    Ok(upgraded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block};
    use serde_json::json;

    fn v0() -> Schema {
        Schema::new(0, vec![Attribute::string("id"), Attribute::bool("flag")])
    }

    fn v1() -> Schema {
        Schema::new(
            1,
            vec![
                Attribute::string("id"),
                Attribute::object("wrapped", Block::new(vec![Attribute::bool("enabled")])),
            ],
        )
    }

    fn v0_to_v1(prior: &Value) -> std::result::Result<Value, Diagnostics> {
        Ok(json!({
            "id": prior["id"],
            "wrapped": { "enabled": prior["flag"] }
        }))
    }

    fn upgraders() -> Vec<StateUpgrader> {
        vec![StateUpgrader {
            prior_version: 0,
            prior_schema: v0,
            upgrade: v0_to_v1,
        }]
    }

    #[test]
    fn test_upgrade_applies_and_bumps_version() {
        let state = ResourceState::new("thing", 0, "x", json!({ "id": "x", "flag": true }));
        let upgraded = upgrade_state(&v1(), &upgraders(), &state).unwrap();

        assert_eq!(upgraded.schema_version, 1);
        assert_eq!(upgraded.attributes["wrapped"]["enabled"], json!(true));
    }

    #[test]
    fn test_current_state_is_left_alone() {
        let state = ResourceState::new("thing", 1, "x", json!({ "id": "x" }));
        assert_eq!(upgrade_state(&v1(), &upgraders(), &state).unwrap(), state);
    }

    #[test]
    fn test_missing_upgrader_is_detected() {
        let err = check_upgraders("thing", 2, &upgraders()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingUpgrader { version: 1, .. }));
        assert!(check_upgraders("thing", 1, &upgraders()).is_ok());
    }

    #[test]
    fn test_prior_shape_mismatch_is_fatal() {
        let state = ResourceState::new("thing", 0, "x", json!({ "id": "x", "flag": "yes" }));
        let diags = upgrade_state(&v1(), &upgraders(), &state).unwrap_err();
        assert!(diags.has_error());
    }

    #[test]
    fn test_newer_state_is_rejected() {
        let state = ResourceState::new("thing", 5, "x", json!({}));
        assert!(upgrade_state(&v1(), &upgraders(), &state).is_err());
    }
}
