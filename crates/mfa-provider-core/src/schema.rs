//! Attribute schemas for resources and data sources
//!
//! A [`Schema`] describes the attribute tree the host stores for a resource:
//! types, presence (required, optional, computed), sensitivity, defaults,
//! validators, replacement triggers and diff-suppression predicates. The same
//! description drives plan-time validation, default filling and diffing.

use crate::diag::{Diagnostic, Diagnostics};
use crate::json::semantically_equal;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

/// Placeholder written into state for write-only secrets the API never returns.
pub const DUMMY_SUPPRESS_VALUE: &str = "DUMMY_SUPPRESS_VALUE";

/// Returns `true` when a change from `old` to `new` should not produce a diff.
pub type DiffSuppressFn = fn(old: &Value, new: &Value) -> bool;

/// Suppresses the diff whenever the prior value is [`DUMMY_SUPPRESS_VALUE`].
pub fn suppress_dummy_value(old: &Value, _new: &Value) -> bool {
    old.as_str() == Some(DUMMY_SUPPRESS_VALUE)
}

/// Value type of an attribute
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "block", rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// JSON document held as a string, compared semantically
    Json,
    StringSet,
    /// A single nested object; null when absent
    Object(Block),
    /// A list of nested blocks, the shape older schema versions used
    ObjectList(Block),
    ObjectSet(Block),
}

impl AttributeType {
    fn expected(&self) -> &'static str {
        match self {
            AttributeType::String | AttributeType::Json => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int => "number",
            AttributeType::StringSet => "set of string",
            AttributeType::Object(_) => "object",
            AttributeType::ObjectList(_) => "list of object",
            AttributeType::ObjectSet(_) => "set of object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Set by the provider only
    Computed,
    /// Set by the user, or by the provider when the user leaves it out
    OptionalComputed,
}

impl Presence {
    pub fn is_computed(self) -> bool {
        matches!(self, Presence::Computed | Presence::OptionalComputed)
    }
}

/// When a change to the attribute forces the resource to be replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceWhen {
    Never,
    Changed,
    /// Only when the value goes from null to set or back
    PresenceChanged,
}

/// Plan-time validation rule
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "rule", content = "args", rename_all = "snake_case")]
pub enum Validator {
    OneOf(&'static [&'static str]),
    IntBetween(i64, i64),
    IntAtLeast(i64),
    LengthAtLeast(usize),
    LengthAtMost(usize),
    /// Minimum element count of a list or set
    SizeAtLeast(usize),
    /// Regular expression the string must match, and the message shown when it does not
    Matches(&'static str, &'static str),
    /// UUID formatted identifier
    ResourceId,
    ValidJson,
    /// Sibling attributes that must be set alongside this one
    RequiredWith(&'static [&'static str]),
    /// Sibling attributes that must not be set alongside this one
    ConflictsWith(&'static [&'static str]),
}

impl Validator {
    fn check(&self, name: &str, value: &Value, siblings: &Map<String, Value>) -> Vec<Diagnostic> {
        let invalid = |detail: String| vec![Diagnostic::error("Invalid attribute value", detail)];

        match self {
            Validator::OneOf(allowed) => match value.as_str() {
                Some(s) if !allowed.contains(&s) => invalid(format!(
                    "expected {} to be one of [{}], got {}",
                    name,
                    allowed.join(", "),
                    s
                )),
                _ => Vec::new(),
            },
            Validator::IntBetween(min, max) => match value.as_i64() {
                Some(n) if n < *min || n > *max => invalid(format!(
                    "expected {} to be in the range ({} - {}), got {}",
                    name, min, max, n
                )),
                _ => Vec::new(),
            },
            Validator::IntAtLeast(min) => match value.as_i64() {
                Some(n) if n < *min => {
                    invalid(format!("expected {} to be at least ({}), got {}", name, min, n))
                }
                _ => Vec::new(),
            },
            Validator::LengthAtLeast(min) => match value.as_str() {
                Some(s) if s.chars().count() < *min => invalid(format!(
                    "expected length of {} to be at least {}, got {}",
                    name,
                    min,
                    s.chars().count()
                )),
                _ => Vec::new(),
            },
            Validator::LengthAtMost(max) => match value.as_str() {
                Some(s) if s.chars().count() > *max => invalid(format!(
                    "expected length of {} to be at most {}, got {}",
                    name,
                    max,
                    s.chars().count()
                )),
                _ => Vec::new(),
            },
            Validator::SizeAtLeast(min) => match value.as_array() {
                Some(items) if items.len() < *min => invalid(format!(
                    "{} must contain at least {} elements, got: {}",
                    name,
                    min,
                    items.len()
                )),
                _ => Vec::new(),
            },
            Validator::Matches(pattern, message) => match value.as_str() {
                Some(s) => match Regex::new(pattern) {
                    Ok(re) if re.is_match(s) => Vec::new(),
                    Ok(_) => invalid(format!("{} {}, got: {}", name, message, s)),
                    Err(error) => vec![Diagnostic::internal(format!(
                        "The validation pattern of {} does not compile: {}",
                        name, error
                    ))],
                },
                None => Vec::new(),
            },
            Validator::ResourceId => match value.as_str() {
                Some(s) if !is_resource_id(s) => invalid(format!(
                    "expected {} to be a valid resource ID (UUID), got {}",
                    name, s
                )),
                _ => Vec::new(),
            },
            Validator::ValidJson => match value.as_str() {
                Some(s) if serde_json::from_str::<Value>(s).is_err() => {
                    invalid(format!("expected {} to contain a valid JSON document", name))
                }
                _ => Vec::new(),
            },
            Validator::RequiredWith(others) => others
                .iter()
                .filter(|other| !is_configured(siblings, other))
                .map(|other| {
                    Diagnostic::error(
                        "Missing required argument",
                        format!("\"{}\": all of `{}` must be specified", other, {
                            let mut all = vec![name];
                            all.extend(others.iter().copied());
                            all.join(",")
                        }),
                    )
                })
                .collect(),
            Validator::ConflictsWith(others) => others
                .iter()
                .filter(|other| is_configured(siblings, other))
                .map(|other| {
                    Diagnostic::error(
                        "Conflicting configuration arguments",
                        format!("\"{}\": conflicts with {}", name, other),
                    )
                })
                .collect(),
        }
    }
}

fn is_configured(object: &Map<String, Value>, name: &str) -> bool {
    object.get(name).is_some_and(|v| !v.is_null())
}

/// Canonical hyphenated UUID, the format every service identifier uses
pub fn is_resource_id(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::try_parse(s).is_ok()
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: &'static str,

    #[serde(flatten)]
    pub kind: AttributeType,

    pub presence: Presence,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,

    pub sensitive: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,

    pub replace: ReplaceWhen,

    #[serde(skip)]
    pub diff_suppress: Option<DiffSuppressFn>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<&'static str>,
}

impl Attribute {
    pub fn new(name: &'static str, kind: AttributeType) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
            description: "",
            sensitive: false,
            default: None,
            validators: Vec::new(),
            replace: ReplaceWhen::Never,
            diff_suppress: None,
            deprecated: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, AttributeType::Int)
    }

    pub fn json(name: &'static str) -> Self {
        Self::new(name, AttributeType::Json).validate(Validator::ValidJson)
    }

    pub fn string_set(name: &'static str) -> Self {
        Self::new(name, AttributeType::StringSet)
    }

    pub fn object(name: &'static str, block: Block) -> Self {
        Self::new(name, AttributeType::Object(block))
    }

    pub fn object_list(name: &'static str, block: Block) -> Self {
        Self::new(name, AttributeType::ObjectList(block))
    }

    pub fn object_set(name: &'static str, block: Block) -> Self {
        Self::new(name, AttributeType::ObjectSet(block))
    }

    /// The conventional computed `id` attribute
    pub fn id() -> Self {
        Self::string("id")
            .computed()
            .describe("The ID of the resource.")
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Write-only secret: sensitive, and its diff is suppressed against the placeholder.
    pub fn write_only(self) -> Self {
        self.sensitive().suppress_diff(suppress_dummy_value)
    }

    /// Default value; makes the attribute optional+computed like the host does.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        if self.presence == Presence::Optional {
            self.presence = Presence::OptionalComputed;
        }
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn force_new(mut self) -> Self {
        self.replace = ReplaceWhen::Changed;
        self
    }

    pub fn replace_if_presence_changes(mut self) -> Self {
        self.replace = ReplaceWhen::PresenceChanged;
        self
    }

    pub fn suppress_diff(mut self, predicate: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(predicate);
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }
}

/// An object's attributes plus object-level constraints
#[derive(Debug, Clone, Default, Serialize)]
pub struct Block {
    pub attributes: Vec<Attribute>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exactly_one_of: Vec<&'static [&'static str]>,
}

impl Block {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            exactly_one_of: Vec::new(),
        }
    }

    pub fn exactly_one_of(mut self, names: &'static [&'static str]) -> Self {
        self.exactly_one_of.push(names);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub version: u64,

    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<&'static str>,

    pub block: Block,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Config,
    State,
}

impl Schema {
    pub fn new(version: u64, attributes: Vec<Attribute>) -> Self {
        Self {
            version,
            description: "",
            deprecation: None,
            block: Block::new(attributes),
        }
    }

    pub fn with_block(version: u64, block: Block) -> Self {
        Self {
            version,
            description: "",
            deprecation: None,
            block,
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecation = Some(message);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attribute(name)
    }

    /// Validate a user configuration. Errors carry the attribute path.
    pub fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match config.as_object() {
            Some(object) => check_block(&self.block, object, "", Mode::Config, &mut diags),
            None => diags.add_error(
                "Invalid configuration",
                "The configuration must be an object of attributes.",
            ),
        }
        if let Some(message) = self.deprecation {
            diags.add_warning("Resource deprecated", message);
        }
        diags
    }

    /// Check that stored state matches this schema's shape (types and names only).
    pub fn check_state(&self, state: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match state.as_object() {
            Some(object) => check_block(&self.block, object, "", Mode::State, &mut diags),
            None => diags.add_error(
                "Invalid state",
                "The stored state must be an object of attributes.",
            ),
        }
        diags
    }

    /// Fill defaults into a configuration. Every attribute the schema knows ends
    /// up present in the result, null when it has neither value nor default.
    pub fn apply_defaults(&self, config: &Value) -> Value {
        let mut out = config.clone();
        if let Some(object) = out.as_object_mut() {
            fill_block(&self.block, object);
        }
        out
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn check_block(
    block: &Block,
    object: &Map<String, Value>,
    path: &str,
    mode: Mode,
    diags: &mut Diagnostics,
) {
    for key in object.keys() {
        if block.attribute(key).is_none() {
            diags.push(
                Diagnostic::error(
                    "Unsupported argument",
                    format!("An argument named \"{}\" is not expected here.", key),
                )
                .at(join(path, key)),
            );
        }
    }

    for attr in &block.attributes {
        let attr_path = join(path, attr.name);
        let value = object.get(attr.name).filter(|v| !v.is_null());

        let Some(value) = value else {
            if mode == Mode::Config && attr.presence == Presence::Required {
                diags.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!(
                            "The argument \"{}\" is required, but no definition was found.",
                            attr.name
                        ),
                    )
                    .at(attr_path),
                );
            }
            continue;
        };

        if mode == Mode::Config && attr.presence == Presence::Computed {
            diags.push(
                Diagnostic::error(
                    "Value for unconfigurable attribute",
                    format!(
                        "Can't configure a value for \"{}\": its value will be decided automatically based on the result of applying this configuration.",
                        attr.name
                    ),
                )
                .at(attr_path),
            );
            continue;
        }

        if !check_value(attr, value, &attr_path, mode, diags) {
            continue;
        }

        if mode == Mode::Config {
            if let Some(message) = attr.deprecated {
                diags.push(Diagnostic::warning("Argument is deprecated", message).at(&attr_path));
            }
            for validator in &attr.validators {
                for diag in validator.check(attr.name, value, object) {
                    diags.push(diag.at(&attr_path));
                }
            }
        }
    }

    if mode == Mode::Config {
        for group in &block.exactly_one_of {
            let configured = group.iter().filter(|n| is_configured(object, n)).count();
            if configured != 1 {
                let diag = Diagnostic::error(
                    "Invalid Attribute Combination",
                    format!(
                        "Exactly one of these attributes must be configured: [{}]",
                        group.join(", ")
                    ),
                );
                diags.push(if path.is_empty() { diag } else { diag.at(path) });
            }
        }
    }
}

fn check_value(
    attr: &Attribute,
    value: &Value,
    path: &str,
    mode: Mode,
    diags: &mut Diagnostics,
) -> bool {
    let type_error = |path: &str| {
        Diagnostic::error(
            "Incorrect attribute value type",
            format!(
                "Inappropriate value for attribute \"{}\": {} required.",
                attr.name,
                attr.kind.expected()
            ),
        )
        .at(path)
    };

    let ok = match &attr.kind {
        AttributeType::String | AttributeType::Json => value.is_string(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::Int => value.is_i64(),
        AttributeType::StringSet => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        AttributeType::Object(block) => match value.as_object() {
            Some(object) => {
                check_block(block, object, path, mode, diags);
                true
            }
            None => false,
        },
        AttributeType::ObjectList(block) | AttributeType::ObjectSet(block) => {
            match value.as_array() {
                Some(items) => {
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", path, i);
                        match item.as_object() {
                            Some(object) => check_block(block, object, &item_path, mode, diags),
                            None => diags.push(type_error(&item_path)),
                        }
                    }
                    true
                }
                None => false,
            }
        }
    };

    if !ok {
        diags.push(type_error(path));
    }
    ok
}

fn fill_block(block: &Block, object: &mut Map<String, Value>) {
    for attr in &block.attributes {
        let entry = object.entry(attr.name).or_insert(Value::Null);
        if entry.is_null() {
            if let Some(default) = &attr.default {
                *entry = default.clone();
            }
        }

        match (&attr.kind, entry) {
            (AttributeType::Object(nested), Value::Object(inner)) => fill_block(nested, inner),
            (
                AttributeType::ObjectList(nested) | AttributeType::ObjectSet(nested),
                Value::Array(items),
            ) => {
                for item in items {
                    if let Value::Object(inner) = item {
                        fill_block(nested, inner);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Equality the way the diff sees it: sets ignore order, JSON ignores formatting.
pub fn values_equal(kind: &AttributeType, a: &Value, b: &Value) -> bool {
    match (kind, a, b) {
        (AttributeType::Json, Value::String(a), Value::String(b)) => semantically_equal(a, b),
        (AttributeType::StringSet, Value::Array(a), Value::Array(b)) => {
            canonical_set(a, None) == canonical_set(b, None)
        }
        (AttributeType::ObjectSet(block), Value::Array(a), Value::Array(b)) => {
            canonical_set(a, Some(block)) == canonical_set(b, Some(block))
        }
        _ => a == b,
    }
}

/// Sorted, de-duplicated element encodings. Computed-only attributes of set
/// elements are left out since configuration never carries them.
fn canonical_set(items: &[Value], block: Option<&Block>) -> Vec<String> {
    let mut out: Vec<String> = items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            if let (Some(block), Value::Object(object)) = (block, &mut item) {
                for attr in &block.attributes {
                    if attr.presence == Presence::Computed {
                        object.remove(attr.name);
                    }
                }
                object.retain(|_, v| !v.is_null());
            }
            item.to_string()
        })
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UNITS: &[&str] = &["MINUTES", "SECONDS"];

    fn device_block() -> Block {
        Block::new(vec![
            Attribute::bool("enabled").required(),
            Attribute::int("otp_lifetime_duration").default(30),
            Attribute::string("otp_lifetime_timeunit")
                .default("MINUTES")
                .validate(Validator::OneOf(UNITS))
                .validate(Validator::RequiredWith(&["otp_lifetime_duration"])),
        ])
    }

    fn schema() -> Schema {
        Schema::new(
            0,
            vec![
                Attribute::id(),
                Attribute::string("environment_id")
                    .required()
                    .force_new()
                    .validate(Validator::ResourceId),
                Attribute::string("name")
                    .required()
                    .validate(Validator::LengthAtLeast(1)),
                Attribute::object("sms", device_block()).required(),
                Attribute::object("fido2", Block::new(vec![Attribute::bool("enabled")]))
                    .validate(Validator::ConflictsWith(&["platform"])),
                Attribute::object("platform", Block::new(vec![Attribute::bool("enabled")])),
            ],
        )
    }

    const ENV: &str = "7a1c3a3a-0d6b-4b4e-9b5e-2b7f6e1d8c11";

    #[test]
    fn test_valid_config_has_no_diagnostics() {
        let config = json!({
            "environment_id": ENV,
            "name": "p1",
            "sms": { "enabled": true, "otp_lifetime_duration": 60, "otp_lifetime_timeunit": "SECONDS" }
        });
        let diags = schema().validate_config(&config);
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_missing_required_reports_path() {
        let config = json!({ "environment_id": ENV, "name": "p1", "sms": {} });
        let diags = schema().validate_config(&config);

        let err = diags.errors().next().unwrap();
        assert_eq!(err.summary, "Missing required argument");
        assert_eq!(err.path.as_deref(), Some("sms.enabled"));
    }

    #[test]
    fn test_required_with_timeunit_needs_duration() {
        let config = json!({
            "environment_id": ENV,
            "name": "p1",
            "sms": { "enabled": true, "otp_lifetime_timeunit": "SECONDS" }
        });
        let diags = schema().validate_config(&config);

        let err = diags.errors().next().unwrap();
        assert_eq!(err.path.as_deref(), Some("sms.otp_lifetime_timeunit"));
        assert!(err.detail.contains("otp_lifetime_duration"));
    }

    #[test]
    fn test_one_of_and_resource_id() {
        let config = json!({
            "environment_id": "not-a-uuid",
            "name": "p1",
            "sms": { "enabled": true, "otp_lifetime_duration": 5, "otp_lifetime_timeunit": "DAYS" }
        });
        let diags = schema().validate_config(&config);
        let paths: Vec<_> = diags.errors().filter_map(|d| d.path.clone()).collect();
        assert!(paths.contains(&"environment_id".to_string()));
        assert!(paths.contains(&"sms.otp_lifetime_timeunit".to_string()));
    }

    #[test]
    fn test_conflicts_with() {
        let config = json!({
            "environment_id": ENV,
            "name": "p1",
            "sms": { "enabled": true },
            "fido2": { "enabled": true },
            "platform": { "enabled": true }
        });
        let diags = schema().validate_config(&config);
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "Conflicting configuration arguments"
        );
    }

    #[test]
    fn test_computed_attribute_cannot_be_configured() {
        let config = json!({ "id": "x", "environment_id": ENV, "name": "p", "sms": { "enabled": true } });
        let diags = schema().validate_config(&config);
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "Value for unconfigurable attribute"
        );
        assert!(schema().check_state(&config).is_empty());
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let config = json!({ "environment_id": ENV, "name": "p", "sms": { "enabled": true, "colour": "red" } });
        let diags = schema().validate_config(&config);
        assert_eq!(
            diags.errors().next().unwrap().path.as_deref(),
            Some("sms.colour")
        );
    }

    #[test]
    fn test_exactly_one_of() {
        let block = Block::new(vec![
            Attribute::object("fcm", Block::default()),
            Attribute::object("apns", Block::default()),
        ])
        .exactly_one_of(&["fcm", "apns"]);
        let schema = Schema::with_block(1, block);

        assert!(!schema.validate_config(&json!({ "fcm": {} })).has_error());
        assert!(schema.validate_config(&json!({})).has_error());
        assert!(schema.validate_config(&json!({ "fcm": {}, "apns": {} })).has_error());
    }

    #[test]
    fn test_apply_defaults_fills_nested_and_nulls() {
        let config = json!({ "environment_id": ENV, "name": "p", "sms": { "enabled": true } });
        let planned = schema().apply_defaults(&config);

        assert_eq!(planned["sms"]["otp_lifetime_duration"], json!(30));
        assert_eq!(planned["sms"]["otp_lifetime_timeunit"], json!("MINUTES"));
        assert_eq!(planned["fido2"], Value::Null);
        assert!(planned.as_object().unwrap().contains_key("id"));
    }

    #[test]
    fn test_set_equality_ignores_order_and_computed() {
        let block = Block::new(vec![
            Attribute::string("id").required(),
            Attribute::string("timeunit").computed(),
        ]);
        let kind = AttributeType::ObjectSet(block);

        let planned = json!([{ "id": "b", "timeunit": null }, { "id": "a" }]);
        let state = json!([{ "id": "a", "timeunit": "SECONDS" }, { "id": "b", "timeunit": "SECONDS" }]);
        assert!(values_equal(&kind, &planned, &state));

        assert!(values_equal(&AttributeType::StringSet, &json!(["x", "y"]), &json!(["y", "x"])));
    }

    #[test]
    fn test_suppress_dummy_value() {
        assert!(suppress_dummy_value(&json!(DUMMY_SUPPRESS_VALUE), &json!("K")));
        assert!(!suppress_dummy_value(&json!("K"), &json!("K2")));
    }

    #[test]
    fn test_length_size_and_pattern_validators() {
        let schema = Schema::new(
            0,
            vec![
                Attribute::string("display").validate(Validator::LengthAtMost(5)),
                Attribute::string_set("ids").validate(Validator::SizeAtLeast(1)),
                Attribute::string("domain").validate(Validator::Matches(
                    r"^(?:[\w-]+\.)+[a-z]{2,}$",
                    "must be a valid domain name",
                )),
            ],
        );

        let ok = schema.validate_config(&json!({
            "display": "short",
            "ids": ["a"],
            "domain": "bxretail.org",
        }));
        assert!(ok.is_empty(), "{:?}", ok);

        let bad = schema.validate_config(&json!({
            "display": "too long",
            "ids": [],
            "domain": "localhost",
        }));
        let paths: Vec<_> = bad.errors().filter_map(|d| d.path.as_deref()).collect();
        assert_eq!(paths, vec!["display", "ids", "domain"]);
        assert!(bad.errors().any(|d| d.detail.contains("must be a valid domain name")));
    }
}
