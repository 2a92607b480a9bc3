//! Host-side driving of a resource through plan, apply, refresh and import

use crate::action::{Action, ActionType};
use crate::context::RequestContext;
use crate::diag::{Diagnostic, Diagnostics};
use crate::resource::{DataSource, Outcome, Resource};
use crate::schema::{AttributeType, Block};
use crate::state::ResourceState;
use crate::upgrade::upgrade_state;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// The action for one resource plus the value it will converge to
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub action: Action,

    /// Configuration with defaults and carried-over computed values
    pub planned: Option<Value>,
}

/// Plan one resource: `prior` is refreshed state, `config` the desired configuration.
pub fn plan(
    resource: &dyn Resource,
    prior: Option<&ResourceState>,
    config: Option<&Value>,
) -> (Option<PlannedChange>, Diagnostics) {
    let schema = resource.schema();
    let mut diags = Diagnostics::new();
    let prior = prior.filter(|state| !state.is_removed());

    let planned = match config {
        Some(config) => {
            diags.append(schema.validate_config(config));
            if !diags.has_error() {
                diags.append(resource.validate_config(config));
            }
            if diags.has_error() {
                return (None, diags);
            }
            let mut planned = schema.apply_defaults(config);
            if let Some(prior) = prior {
                carry_computed(&schema.block, &prior.attributes, &mut planned);
            }
            Some(planned)
        }
        None => None,
    };

    let resource_id = prior.map(|s| s.id.as_str()).unwrap_or_default();
    let action = Action::between(
        resource.type_name(),
        &schema.block,
        resource_id,
        prior.map(|s| &s.attributes),
        planned.as_ref(),
    );

    (Some(PlannedChange { action, planned }), diags)
}

/// Computed values the configuration leaves unset keep their prior value.
fn carry_computed(block: &Block, prior: &Value, planned: &mut Value) {
    let Some(planned) = planned.as_object_mut() else {
        return;
    };

    for attr in &block.attributes {
        let Some(prior_value) = prior.get(attr.name) else {
            continue;
        };
        let entry = planned.entry(attr.name).or_insert(Value::Null);

        if attr.presence.is_computed() && entry.is_null() {
            *entry = prior_value.clone();
        } else if let AttributeType::Object(nested) = &attr.kind {
            carry_computed(nested, prior_value, entry);
        }
    }
}

fn into_state(resource: &dyn Resource, attributes: Value) -> ResourceState {
    ResourceState::new(
        resource.type_name(),
        resource.schema().version,
        resource.state_id(&attributes),
        attributes,
    )
}

/// Execute a planned change. Returns the new state (`None` when the resource
/// no longer exists) and the diagnostics of every call made.
#[instrument(skip_all, fields(resource_type = resource.type_name(), action = %change.action.action_type))]
pub async fn apply(
    resource: &dyn Resource,
    ctx: &RequestContext,
    change: &PlannedChange,
    prior: Option<&ResourceState>,
) -> (Option<ResourceState>, Diagnostics) {
    let prior = prior.filter(|state| !state.is_removed());
    let prior_attributes = prior.map(|s| &s.attributes);

    let outcome = match (change.action.action_type, change.planned.as_ref(), prior_attributes) {
        (ActionType::NoOp, _, _) => return (prior.cloned(), Diagnostics::new()),
        (ActionType::Create, Some(planned), _) => resource.create(ctx, planned).await,
        (ActionType::Update, Some(planned), Some(prior_attributes)) => {
            resource.update(ctx, planned, prior_attributes).await
        }
        (ActionType::Replace, Some(planned), Some(prior_attributes)) => {
            let diags = resource.delete(ctx, prior_attributes).await;
            if diags.has_error() {
                return (prior.cloned(), diags);
            }
            let outcome = resource.create(ctx, planned).await.after(diags);
            // The prior object is gone, so a failed create leaves nothing behind.
            if outcome.diagnostics.has_error() {
                warn!(
                    resource_type = resource.type_name(),
                    "Replacement create failed after delete"
                );
                return (None, outcome.diagnostics);
            }
            outcome
        }
        (ActionType::Delete, _, Some(prior_attributes)) => {
            let diags = resource.delete(ctx, prior_attributes).await;
            if diags.has_error() {
                return (prior.cloned(), diags);
            }
            info!(resource_type = resource.type_name(), "Resource destroyed");
            return (None, diags);
        }
        (action_type, _, _) => {
            return (
                prior.cloned(),
                Diagnostic::internal(format!(
                    "Planned {} action is missing its planned or prior value.",
                    action_type
                ))
                .into(),
            );
        }
    };

    if outcome.diagnostics.has_error() {
        return (prior.cloned(), outcome.diagnostics);
    }

    match outcome.state {
        Some(attributes) => {
            let state = into_state(resource, attributes);
            info!(resource_type = resource.type_name(), id = %state.id, "Resource applied");
            (Some(state), outcome.diagnostics)
        }
        None => (None, outcome.diagnostics),
    }
}

/// Refresh stored state. A resource found missing keeps its attributes but
/// loses its ID.
pub async fn refresh(
    resource: &dyn Resource,
    ctx: &RequestContext,
    state: &ResourceState,
) -> (ResourceState, Diagnostics) {
    let state = match upgrade_state(&resource.schema(), &resource.upgraders(), state) {
        Ok(state) => state,
        Err(diags) => return (state.clone(), diags),
    };

    let outcome = resource.read(ctx, &state.attributes).await;
    finish_read(resource, state, outcome)
}

fn finish_read(
    resource: &dyn Resource,
    prior: ResourceState,
    outcome: Outcome,
) -> (ResourceState, Diagnostics) {
    if outcome.diagnostics.has_error() {
        return (prior, outcome.diagnostics);
    }

    match outcome.state {
        Some(attributes) => (into_state(resource, attributes), outcome.diagnostics),
        None => {
            let mut removed = prior;
            removed.mark_removed();
            (removed, outcome.diagnostics)
        }
    }
}

/// Import an existing remote object by its composite identifier.
pub async fn import(
    resource: &dyn Resource,
    ctx: &RequestContext,
    id: &str,
) -> (Option<ResourceState>, Diagnostics) {
    let outcome = resource.import(ctx, id).await;
    if outcome.diagnostics.has_error() {
        return (None, outcome.diagnostics);
    }

    match outcome.state {
        Some(attributes) => (Some(into_state(resource, attributes)), outcome.diagnostics),
        None => {
            let mut diags = outcome.diagnostics;
            diags.add_error(
                "Cannot import non-existent remote object",
                format!(
                    "While attempting to import an existing object of type {} with ID \"{}\", the object was not found.",
                    resource.type_name(),
                    id
                ),
            );
            (None, diags)
        }
    }
}

/// Run a data source query
pub async fn query(
    data_source: &dyn DataSource,
    ctx: &RequestContext,
    config: &Value,
) -> (Option<Value>, Diagnostics) {
    let schema = data_source.schema();
    let mut diags = schema.validate_config(config);
    if diags.has_error() {
        return (None, diags);
    }

    let outcome = data_source.read(ctx, &schema.apply_defaults(config)).await;
    diags.append(outcome.diagnostics);
    (outcome.state, diags)
}
