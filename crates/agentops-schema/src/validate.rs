//! # Schema Validation
//!
//! Recursive matcher over a schema node and a payload value.
//!
//! ## Algorithm
//!
//! For each (schema node, value, path) triple, in order:
//!
//! 1. `type`: on mismatch record one violation and stop checking this
//!    node. Sibling and ancestor nodes are unaffected.
//! 2. `enum`, 3. `const`: numeric-aware equality, see [`coerce::loose_eq`].
//! 4. `minimum`, 5. `minLength`, 6. `format`.
//! 7. Object shape: `required`, then every present key in insertion order:
//!    its `properties` schema if declared, else `additionalProperties`.
//! 8. `allOf`: each entry with a `then` applies when it has no `if`, or
//!    when the value satisfies the `if` schema in full. The `if` probe runs
//!    into its own accumulator and never touches the caller's.
//!
//! Violations accumulate in discovery order. Nothing short-circuits across
//! nodes, so a single call reports every problem in the payload.
//!
//! ## Thread Safety
//!
//! `EventValidator` is `Send + Sync`. The schema is immutable after
//! construction and each call allocates its own accumulator, so one
//! instance can serve any number of concurrent callers. Hot reload means
//! building a new instance and swapping an `Arc`, never mutating in place.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce;
use crate::format;
use crate::load::{self, SchemaLoadError};

/// Path of the document root.
pub const ROOT_PATH: &str = "$";

/// Message reported when validation is attempted without a validator.
pub const NOT_CONFIGURED_MESSAGE: &str = "validator is not configured";

/// A single nonconformance between a payload and the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Root-anchored dotted locator, e.g. `$.tenant.workspace_id`.
    pub path: String,
    /// Human-readable description of the violated constraint.
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Owned, ordered collection of violations from one validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if the payload conforms.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if any violation sits at exactly `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for ValidationReport {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

/// Anything that can judge a decoded payload.
///
/// This is the seam the transport layer depends on. `Option<T>` implements
/// it too: `None` reports a single [`NOT_CONFIGURED_MESSAGE`] violation at
/// the root instead of panicking the caller.
pub trait PayloadValidator: Send + Sync {
    /// Return every violation in `payload`; empty means it conforms.
    fn validate(&self, payload: &Value) -> Vec<Violation>;
}

/// Validator for one immutable schema document.
#[derive(Debug, Clone)]
pub struct EventValidator {
    schema: Value,
    source: Option<PathBuf>,
}

impl EventValidator {
    /// Load a schema file and build a validator from it.
    ///
    /// See [`load::resolve_schema_path`] for how `path` is located.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError`] if the file cannot be found, read or
    /// parsed, or if its root is not a mapping.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let resolved = load::resolve_schema_path(path.as_ref())?;
        let schema = load::read_schema(&resolved)?;
        Ok(Self {
            schema,
            source: Some(resolved),
        })
    }

    /// Build a validator from an already-decoded schema.
    pub fn from_value(schema: Value) -> Result<Self, SchemaLoadError> {
        if !schema.is_object() {
            return Err(SchemaLoadError::NotAnObject {
                origin: "<inline>".to_string(),
            });
        }
        Ok(Self {
            schema,
            source: None,
        })
    }

    /// The schema document this validator enforces.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Resolved file the schema was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Validate a payload, returning a fresh list of violations.
    pub fn validate(&self, payload: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        validate_node(&self.schema, payload, ROOT_PATH, &mut violations);
        violations
    }

    /// Validate a payload, wrapping the result in a [`ValidationReport`].
    pub fn report(&self, payload: &Value) -> ValidationReport {
        self.validate(payload).into()
    }

    /// True when the payload satisfies the whole schema.
    pub fn matches(&self, payload: &Value) -> bool {
        satisfies(&self.schema, payload)
    }
}

impl PayloadValidator for EventValidator {
    fn validate(&self, payload: &Value) -> Vec<Violation> {
        EventValidator::validate(self, payload)
    }
}

impl<T: PayloadValidator + ?Sized> PayloadValidator for Arc<T> {
    fn validate(&self, payload: &Value) -> Vec<Violation> {
        (**self).validate(payload)
    }
}

impl<T: PayloadValidator + ?Sized> PayloadValidator for &T {
    fn validate(&self, payload: &Value) -> Vec<Violation> {
        (**self).validate(payload)
    }
}

impl<T: PayloadValidator> PayloadValidator for Option<T> {
    fn validate(&self, payload: &Value) -> Vec<Violation> {
        match self {
            Some(validator) => validator.validate(payload),
            None => vec![Violation::new(ROOT_PATH, NOT_CONFIGURED_MESSAGE)],
        }
    }
}

fn validate_node(schema: &Value, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(node) = schema.as_object() else {
        return;
    };

    if let Some(type_spec) = node.get("type") {
        if !coerce::matches_type(type_spec, value) {
            let expected = coerce::describe_type(type_spec);
            out.push(Violation::new(path, format!("must be type {expected}")));
            return;
        }
    }

    if let Some(Value::Array(allowed)) = node.get("enum") {
        if !allowed.iter().any(|candidate| coerce::loose_eq(value, candidate)) {
            out.push(Violation::new(path, "must be one of allowed enum values"));
        }
    }

    if let Some(expected) = node.get("const") {
        if !coerce::loose_eq(value, expected) {
            let literal = coerce::render_literal(expected);
            out.push(Violation::new(path, format!("must equal {literal}")));
        }
    }

    // A NaN bound admits every number.
    if let Some(bound) = node
        .get("minimum")
        .and_then(coerce::numeral)
        .filter(|b| !b.is_nan())
    {
        if !coerce::as_number(value).is_some_and(|n| n >= bound) {
            let rendered = coerce::render_bound(bound);
            out.push(Violation::new(path, format!("must be >= {rendered}")));
        }
    }

    if let Some(min) = node.get("minLength").and_then(coerce::numeral) {
        let min = min.trunc() as i64;
        let long_enough = value
            .as_str()
            .is_some_and(|s| s.chars().count() as i64 >= min);
        if !long_enough {
            out.push(Violation::new(path, format!("must have length >= {min}")));
        }
    }

    if let Some(Value::String(name)) = node.get("format") {
        if let Some(message) = format::check(name, value) {
            out.push(Violation::new(path, message));
        }
    }

    if let Value::Object(fields) = value {
        validate_object(node, fields, path, out);
    }

    if let Some(Value::Array(entries)) = node.get("allOf") {
        for entry in entries.iter().filter_map(Value::as_object) {
            let Some(then) = entry.get("then").filter(|s| s.is_object()) else {
                continue;
            };
            let applies = match entry.get("if").filter(|s| s.is_object()) {
                Some(guard) => satisfies(guard, value),
                None => true,
            };
            if applies {
                validate_node(then, value, path, out);
            }
        }
    }
}

fn validate_object(
    node: &Map<String, Value>,
    fields: &Map<String, Value>,
    path: &str,
    out: &mut Vec<Violation>,
) {
    if let Some(Value::Array(required)) = node.get("required") {
        for name in required.iter().filter_map(Value::as_str) {
            if !fields.contains_key(name) {
                out.push(Violation::new(child_path(path, name), "is required"));
            }
        }
    }

    let properties = node.get("properties").and_then(Value::as_object);
    let additional = node.get("additionalProperties");

    for (key, child) in fields {
        let child_path = child_path(path, key);
        match properties.and_then(|props| props.get(key)) {
            Some(declared @ Value::Object(_)) => validate_node(declared, child, &child_path, out),
            _ => match additional {
                Some(Value::Bool(false)) => {
                    out.push(Violation::new(child_path, "additional property is not allowed"));
                }
                Some(extra @ Value::Object(_)) => validate_node(extra, child, &child_path, out),
                _ => {}
            },
        }
    }
}

/// Side-effect-free probe: does `value` satisfy `schema` in full?
fn satisfies(schema: &Value, value: &Value) -> bool {
    let mut probe = Vec::new();
    validate_node(schema, value, ROOT_PATH, &mut probe);
    probe.is_empty()
}

fn child_path(parent: &str, field: &str) -> String {
    format!("{parent}.{field}")
}
