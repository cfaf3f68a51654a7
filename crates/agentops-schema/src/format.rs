//! # String Formats
//!
//! Checks for the `format` keyword. Only `date-time` and `uuid` are
//! asserted; any other format name is accepted without inspection.

use chrono::DateTime;
use serde_json::Value;
use uuid::{Uuid, Variant};

/// RFC 3339 internet date-time, e.g. `2026-02-07T21:00:00Z`.
pub const DATE_TIME: &str = "date-time";

/// Canonical hyphenated UUID with version 1-5 and RFC 4122 variant.
pub const UUID: &str = "uuid";

/// Check `value` against a named format.
///
/// Returns the violation message, or `None` when the value conforms.
/// Non-string values always fail, whatever the format name.
pub fn check(format: &str, value: &Value) -> Option<String> {
    let Some(text) = value.as_str() else {
        return Some(format!("must match {format} format"));
    };

    match format {
        DATE_TIME if !is_date_time(text) => Some("must be RFC3339 date-time".to_string()),
        UUID if !is_uuid(text) => Some("must be a valid UUID".to_string()),
        _ => None,
    }
}

/// The date and time must be joined by `T` (or `t`); chrono alone also
/// takes a space there.
pub fn is_date_time(text: &str) -> bool {
    text.as_bytes()
        .get(10)
        .is_some_and(|sep| sep.eq_ignore_ascii_case(&b'T'))
        && DateTime::parse_from_rfc3339(text).is_ok()
}

/// Only the 36-character hyphenated form is canonical; braced, URN and
/// simple encodings are rejected even though `Uuid` can parse them.
pub fn is_uuid(text: &str) -> bool {
    if text.len() != 36 {
        return false;
    }
    match Uuid::try_parse(text) {
        Ok(id) => (1..=5).contains(&id.get_version_num()) && id.get_variant() == Variant::RFC4122,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn date_time_accepts_rfc3339() {
        assert!(is_date_time("2026-02-07T21:00:00Z"));
        assert!(is_date_time("2026-02-07T21:00:00.123456Z"));
        assert!(is_date_time("2026-02-07T21:00:00+05:30"));
    }

    #[test]
    fn date_time_rejects_other_shapes() {
        assert!(!is_date_time("not-a-date"));
        assert!(!is_date_time("2026-02-07"));
        assert!(!is_date_time("2026-02-07T21:00:00"));
        assert!(!is_date_time("2026-13-07T21:00:00Z"));
        assert!(!is_date_time("2026-02-07 21:00:00Z"));
        assert!(!is_date_time("2026-02-07T21:00:00.Z"));
    }

    #[test]
    fn uuid_accepts_canonical_versions() {
        assert!(is_uuid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_uuid("6F9619FF-8B86-4011-B42D-00CF4FC964FF"));
        assert!(is_uuid("f47ac10b-58cc-4372-a567-0e02b2c3d479"));
    }

    #[test]
    fn uuid_rejects_bad_version_variant_or_shape() {
        // Version nibble 0 and 7 are outside 1-5.
        assert!(!is_uuid("123e4567-e89b-02d3-a456-426614174000"));
        assert!(!is_uuid("123e4567-e89b-72d3-a456-426614174000"));
        // Variant nibble must be 8, 9, a or b.
        assert!(!is_uuid("123e4567-e89b-12d3-c456-426614174000"));
        assert!(!is_uuid("123e4567e89b12d3a456426614174000"));
        assert!(!is_uuid("{123e4567-e89b-12d3-a456-426614174000}"));
        assert!(!is_uuid("123e4567-e89b-12d3-a456-42661417400g"));
        assert!(!is_uuid(""));
    }

    #[test]
    fn check_reports_messages() {
        assert_eq!(check(DATE_TIME, &json!("2026-02-07T21:00:00Z")), None);
        assert_eq!(
            check(DATE_TIME, &json!("not-a-date")).as_deref(),
            Some("must be RFC3339 date-time")
        );
        assert_eq!(
            check(UUID, &json!("nope")).as_deref(),
            Some("must be a valid UUID")
        );
        assert_eq!(
            check(UUID, &json!(12)).as_deref(),
            Some("must match uuid format")
        );
    }

    #[test]
    fn unknown_formats_accept_strings_only() {
        assert_eq!(check("email", &json!("whatever")), None);
        assert_eq!(
            check("email", &json!(false)).as_deref(),
            Some("must match email format")
        );
    }
}
