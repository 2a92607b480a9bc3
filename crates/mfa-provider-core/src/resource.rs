//! Resource and data source traits
//!
//! Every managed resource type implements [`Resource`]; read-only queries
//! implement [`DataSource`]. Implementations are stateless: everything an
//! operation needs arrives through its arguments.

use crate::context::RequestContext;
use crate::diag::{Diagnostic, Diagnostics};
use crate::import::parse_import_id;
use crate::schema::Schema;
use crate::upgrade::StateUpgrader;
use async_trait::async_trait;
use serde_json::Value;

/// Result of a resource operation
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// New attribute values. `None` when the operation failed or the
    /// resource turned out to be gone.
    pub state: Option<Value>,

    pub diagnostics: Diagnostics,
}

impl Outcome {
    pub fn ok(state: Value) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_diagnostics(state: Option<Value>, diagnostics: Diagnostics) -> Self {
        Self { state, diagnostics }
    }

    /// The resource no longer exists remotely
    pub fn removed(diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }

    pub fn failed(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            state: None,
            diagnostics: diagnostics.into(),
        }
    }

    pub fn is_removed(&self) -> bool {
        self.state.is_none() && !self.diagnostics.has_error()
    }

    /// Prepend earlier diagnostics (e.g. warnings from the write before a read)
    pub fn after(mut self, mut earlier: Diagnostics) -> Self {
        earlier.append(self.diagnostics);
        self.diagnostics = earlier;
        self
    }
}

#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name the host addresses this resource by (e.g. `mfa_policy`)
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Import identifier format, `None` when import is not supported
    fn import_format(&self) -> Option<&'static str> {
        None
    }

    /// Attributes known right after parsing an import identifier
    fn import_attributes(&self, _components: &[String]) -> Value {
        Value::Null
    }

    /// ID the host tracks the resource by
    fn state_id(&self, attributes: &Value) -> String {
        attributes
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Checks spanning several attributes, run once the schema's own
    /// validation passes
    fn validate_config(&self, _config: &Value) -> Diagnostics {
        Diagnostics::new()
    }

    /// State upgraders keyed by prior schema version
    fn upgraders(&self) -> Vec<StateUpgrader> {
        Vec::new()
    }

    async fn create(&self, ctx: &RequestContext, plan: &Value) -> Outcome;

    async fn read(&self, ctx: &RequestContext, state: &Value) -> Outcome;

    async fn update(&self, ctx: &RequestContext, plan: &Value, prior: &Value) -> Outcome;

    async fn delete(&self, ctx: &RequestContext, state: &Value) -> Diagnostics;

    async fn import(&self, ctx: &RequestContext, id: &str) -> Outcome {
        let Some(format) = self.import_format() else {
            return Outcome::failed(Diagnostic::error(
                "Resource import not supported",
                format!("The {} resource cannot be imported.", self.type_name()),
            ));
        };

        let components = match parse_import_id(id, format) {
            Ok(components) => components,
            Err(diag) => return Outcome::failed(diag),
        };

        let state = self.import_attributes(&components);
        self.read(ctx, &state).await
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &RequestContext, config: &Value) -> Outcome;
}

/// String attribute of an object, `None` when absent, null or not a string
pub fn get_str<'a>(object: &'a Value, name: &str) -> Option<&'a str> {
    object.get(name).and_then(Value::as_str)
}
