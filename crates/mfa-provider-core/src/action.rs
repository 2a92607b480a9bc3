//! Planned actions and the attribute diff behind them

use crate::schema::{AttributeType, Block, Presence, ReplaceWhen, values_equal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One attribute that differs between prior state and the planned value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Dotted attribute path (e.g. `sms.otp_lifetime_duration`)
    pub path: String,

    pub before: Value,

    pub after: Value,

    /// Sensitive values are never printed
    pub sensitive: bool,

    /// Whether this change alone forces replacement
    pub requires_replace: bool,
}

/// Represents a planned action for a managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g. `mfa_policy`)
    pub resource_type: String,

    /// Resource identifier, empty until created
    pub resource_id: String,

    /// Description of the action
    pub description: String,

    /// Attribute-level changes behind the action
    pub changes: Vec<AttributeChange>,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource in place
    Update,
    /// Delete then create
    Replace,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

impl Action {
    /// Build the action that moves `prior` (refreshed state) to `planned`.
    ///
    /// Either side may be absent: no prior state means create, no plan means
    /// delete.
    pub fn between(
        resource_type: &str,
        block: &Block,
        resource_id: &str,
        prior: Option<&Value>,
        planned: Option<&Value>,
    ) -> Self {
        let (action_type, changes) = match (prior, planned) {
            (None, None) => (ActionType::NoOp, Vec::new()),
            (None, Some(planned)) => (ActionType::Create, diff_block(block, &NULL, planned, "")),
            (Some(_), None) => (ActionType::Delete, Vec::new()),
            (Some(prior), Some(planned)) => {
                let changes = diff_block(block, prior, planned, "");
                let action_type = if changes.is_empty() {
                    ActionType::NoOp
                } else if changes.iter().any(|c| c.requires_replace) {
                    ActionType::Replace
                } else {
                    ActionType::Update
                };
                (action_type, changes)
            }
        };

        let description = match action_type {
            ActionType::Create => format!("{} will be created", resource_type),
            ActionType::Update => format!("{} {} will be updated in-place", resource_type, resource_id),
            ActionType::Replace => format!("{} {} must be replaced", resource_type, resource_id),
            ActionType::Delete => format!("{} {} will be destroyed", resource_type, resource_id),
            ActionType::NoOp => format!("{} {} is up to date", resource_type, resource_id),
        };

        Self {
            action_type,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            description,
            changes,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.action_type != ActionType::NoOp
    }
}

static NULL: Value = Value::Null;

fn attribute_value<'a>(object: &'a Value, name: &str) -> &'a Value {
    object.get(name).unwrap_or(&NULL)
}

/// Three-way attribute diff of one object.
///
/// Computed attributes the plan leaves null keep their prior value and never
/// show up as changes. Diff-suppression predicates see `(prior, planned)`.
pub fn diff_block(block: &Block, prior: &Value, planned: &Value, path: &str) -> Vec<AttributeChange> {
    let mut changes = Vec::new();

    for attr in &block.attributes {
        let before = attribute_value(prior, attr.name);
        let after = attribute_value(planned, attr.name);
        let attr_path = if path.is_empty() {
            attr.name.to_string()
        } else {
            format!("{}.{}", path, attr.name)
        };

        if attr.presence.is_computed() && after.is_null() {
            continue;
        }
        if attr.presence == Presence::Computed {
            continue;
        }
        if let Some(suppress) = attr.diff_suppress {
            if !before.is_null() && suppress(before, after) {
                continue;
            }
        }

        if let (AttributeType::Object(nested), Value::Object(_), Value::Object(_)) =
            (&attr.kind, before, after)
        {
            changes.extend(diff_block(nested, before, after, &attr_path));
            continue;
        }

        if values_equal(&attr.kind, before, after) {
            continue;
        }

        let requires_replace = match attr.replace {
            ReplaceWhen::Never => false,
            ReplaceWhen::Changed => true,
            ReplaceWhen::PresenceChanged => before.is_null() != after.is_null(),
        };

        changes.push(AttributeChange {
            path: attr_path,
            before: before.clone(),
            after: after.clone(),
            sensitive: is_sensitive(&attr.kind, attr.sensitive),
            requires_replace,
        });
    }

    changes
}

fn is_sensitive(kind: &AttributeType, sensitive: bool) -> bool {
    sensitive
        || match kind {
            AttributeType::Object(block)
            | AttributeType::ObjectList(block)
            | AttributeType::ObjectSet(block) => block
                .attributes
                .iter()
                .any(|a| is_sensitive(&a.kind, a.sensitive)),
            _ => false,
        }
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(Action::has_changes);
        Self {
            actions,
            has_changes,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            replace: self.actions_by_type(ActionType::Replace).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, DUMMY_SUPPRESS_VALUE};
    use serde_json::json;

    fn block() -> Block {
        Block::new(vec![
            Attribute::id(),
            Attribute::string("environment_id").required().force_new(),
            Attribute::string("name").required(),
            Attribute::string_set("allowed_authenticators"),
            Attribute::object(
                "apns",
                Block::new(vec![
                    Attribute::string("key").required().write_only(),
                    Attribute::string("team_id").required().write_only(),
                ]),
            )
            .replace_if_presence_changes(),
        ])
    }

    #[test]
    fn test_create_when_no_prior() {
        let planned = json!({ "environment_id": "e", "name": "n" });
        let action = Action::between("fido_policy", &block(), "", None, Some(&planned));
        assert_eq!(action.action_type, ActionType::Create);
        assert!(action.changes.iter().any(|c| c.path == "name"));
    }

    #[test]
    fn test_computed_id_is_not_a_change() {
        let prior = json!({ "id": "pol-1", "environment_id": "e", "name": "n" });
        let planned = json!({ "id": null, "environment_id": "e", "name": "n" });
        let action = Action::between("fido_policy", &block(), "pol-1", Some(&prior), Some(&planned));
        assert_eq!(action.action_type, ActionType::NoOp);
    }

    #[test]
    fn test_force_new_attribute_replaces() {
        let prior = json!({ "id": "pol-1", "environment_id": "e1", "name": "n" });
        let planned = json!({ "environment_id": "e2", "name": "m" });
        let action = Action::between("fido_policy", &block(), "pol-1", Some(&prior), Some(&planned));

        assert_eq!(action.action_type, ActionType::Replace);
        assert_eq!(action.changes.len(), 2);
    }

    #[test]
    fn test_set_order_is_not_a_change() {
        let prior = json!({ "environment_id": "e", "name": "n", "allowed_authenticators": ["a", "b"] });
        let planned = json!({ "environment_id": "e", "name": "n", "allowed_authenticators": ["b", "a"] });
        let action = Action::between("fido_policy", &block(), "x", Some(&prior), Some(&planned));
        assert_eq!(action.action_type, ActionType::NoOp);
    }

    #[test]
    fn test_placeholder_secrets_suppress_diff() {
        let prior = json!({
            "environment_id": "e", "name": "n",
            "apns": { "key": DUMMY_SUPPRESS_VALUE, "team_id": DUMMY_SUPPRESS_VALUE }
        });
        let planned = json!({
            "environment_id": "e", "name": "n",
            "apns": { "key": "K", "team_id": "T" }
        });
        let action = Action::between("application_push_credential", &block(), "c", Some(&prior), Some(&planned));
        assert_eq!(action.action_type, ActionType::NoOp);
    }

    #[test]
    fn test_variant_presence_change_replaces() {
        let prior = json!({ "environment_id": "e", "name": "n", "apns": null });
        let planned = json!({ "environment_id": "e", "name": "n", "apns": { "key": "K", "team_id": "T" } });
        let action = Action::between("application_push_credential", &block(), "c", Some(&prior), Some(&planned));

        assert_eq!(action.action_type, ActionType::Replace);
        assert!(action.changes[0].sensitive);
    }

    #[test]
    fn test_plan_summary() {
        let planned = json!({ "environment_id": "e", "name": "n" });
        let plan = Plan::new(vec![
            Action::between("fido_policy", &block(), "", None, Some(&planned)),
            Action::between("fido_policy", &block(), "x", Some(&planned), None),
        ]);

        assert!(plan.has_changes);
        assert_eq!(
            plan.summary().to_string(),
            "1 to create, 0 to update, 0 to replace, 1 to delete, 0 unchanged"
        );
    }
}
