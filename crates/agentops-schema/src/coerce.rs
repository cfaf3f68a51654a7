//! # Value Coercion
//!
//! Helpers that unify the dynamic value representation for the matcher:
//! numeric views, integer-ness, type-name matching and the loose equality
//! used by `enum` and `const`.
//!
//! ## Precision Boundary
//!
//! Every numeric comparison goes through an `f64` view. Integers beyond
//! 2^53 lose precision when viewed this way, so two distinct large
//! integers may compare equal. Integer-ness itself is exact for values
//! stored as `i64`/`u64`; for floating-point values it is decided on the
//! `f64` alone.

use std::borrow::Cow;

use serde_json::Value;

/// Numeric view of a payload value. Only JSON numbers qualify.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Numeric view that also accepts numeral strings such as `"42"` or `"1.5"`.
///
/// Used for equality and for reading bounds out of the schema document.
pub fn numeral(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// True when `value` is a number with no fractional part.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    }
}

/// Check a value against a `type` keyword: a single name or a list of names.
///
/// A malformed `type` keyword (neither string nor array) accepts everything,
/// as does an unknown type name.
pub fn matches_type(type_spec: &Value, value: &Value) -> bool {
    match type_spec {
        Value::String(name) => matches_type_name(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type_name(name, value)),
        _ => true,
    }
}

fn matches_type_name(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "string" => value.is_string(),
        "integer" => is_integer(value),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "array" => value.is_array(),
        _ => true,
    }
}

/// Human-readable form of a `type` keyword, alternatives joined with `|`.
pub fn describe_type(type_spec: &Value) -> String {
    match type_spec {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .map(|name| display_form(name).into_owned())
            .collect::<Vec<_>>()
            .join("|"),
        _ => "unknown".to_string(),
    }
}

/// Equality across representations.
///
/// Two numerals compare by numeric value, so `1`, `1.0` and `"1"` are equal.
/// Null equals only null. Arrays and objects compare element by element.
/// Remaining scalars compare by display form, so `true` equals `"true"`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (numeral(a), numeral(b)) {
        if x == y {
            return true;
        }
    }
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => a.is_null() && b.is_null(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| loose_eq(x, y)))
        }
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        _ => display_form(a) == display_form(b),
    }
}

/// Display form of a value: strings unquoted, everything else as JSON text.
pub fn display_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Literal as shown in messages: numbers through [`render_bound`], anything
/// else through [`display_form`].
pub fn render_literal(value: &Value) -> Cow<'_, str> {
    match as_number(value) {
        Some(n) => Cow::Owned(render_bound(n)),
        None => display_form(value),
    }
}

/// Render a numeric bound for messages: `5` rather than `5.0`, `0.25` as is.
pub fn render_bound(bound: f64) -> String {
    if bound.is_finite() && bound.fract() == 0.0 && bound.abs() < 9.2e18 {
        format!("{}", bound as i64)
    } else {
        format!("{bound}")
    }
}
