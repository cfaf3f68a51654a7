//! # Schema Loading
//!
//! Locates and parses the schema document. This is the only fallible part
//! of the crate: once an [`EventValidator`](crate::EventValidator) exists,
//! validation never fails.
//!
//! ## Path Resolution
//!
//! A blank path falls back to [`DEFAULT_SCHEMA_PATH`]. A relative path is
//! tried as given, then under `..`, `../..` and `../../..`, so binaries and
//! tests started from a crate directory still find the workspace schemas.
//! The first candidate that is a regular file wins.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Workspace-relative location of the v0 agent event schema.
pub const DEFAULT_SCHEMA_PATH: &str = "schemas/agent-event-v0.schema.json";

const PARENT_PREFIXES: [&str; 3] = ["..", "../..", "../../.."];

/// Error while locating or parsing a schema document.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// No candidate path pointed at a regular file.
    #[error("schema file not found from path {path:?}")]
    NotFound {
        /// The path as requested by the caller.
        path: String,
    },

    /// The file exists but could not be read.
    #[error("read schema '{path}': {source}")]
    Read {
        /// Resolved path of the schema file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid JSON or YAML.
    #[error("parse schema '{path}': {reason}")]
    Parse {
        /// Resolved path of the schema file.
        path: String,
        /// Parser error message.
        reason: String,
    },

    /// The document parsed, but its root is not a mapping.
    #[error("schema '{origin}' must be an object at the root")]
    NotAnObject {
        /// File path, or `<inline>` for schemas built from a value.
        origin: String,
    },
}

/// Resolve a schema path against the working directory and its ancestors.
///
/// Returns the canonical absolute path of the first existing candidate.
pub fn resolve_schema_path(path: &Path) -> Result<PathBuf, SchemaLoadError> {
    let requested = if path.to_string_lossy().trim().is_empty() {
        PathBuf::from(DEFAULT_SCHEMA_PATH)
    } else {
        path.to_path_buf()
    };

    let mut candidates = vec![requested.clone()];
    if requested.is_relative() {
        candidates.extend(PARENT_PREFIXES.iter().map(|prefix| Path::new(prefix).join(&requested)));
    }

    let found = candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| SchemaLoadError::NotFound {
            path: requested.display().to_string(),
        })?;

    std::fs::canonicalize(&found).map_err(|source| SchemaLoadError::Read {
        path: found.display().to_string(),
        source,
    })
}

/// Read and parse a schema file.
///
/// `.yaml` / `.yml` files are parsed as YAML, everything else as JSON.
/// The root of the document must be a mapping.
pub fn read_schema(path: &Path) -> Result<Value, SchemaLoadError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Read {
        path: display.clone(),
        source,
    })?;

    let value = parse_document(&content, is_yaml_path(path)).map_err(|reason| {
        SchemaLoadError::Parse {
            path: display.clone(),
            reason,
        }
    })?;

    if !value.is_object() {
        return Err(SchemaLoadError::NotAnObject { origin: display });
    }
    Ok(value)
}

/// True when the file extension marks a YAML document.
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// Parse JSON or YAML text into the canonical value tree.
///
/// YAML is decoded straight into `serde_json::Value`, so mappings with
/// non-string keys are rejected rather than silently stringified.
pub fn parse_document(content: &str, yaml: bool) -> Result<Value, String> {
    if yaml {
        serde_yaml::from_str::<Value>(content).map_err(|e| format!("invalid YAML: {e}"))
    } else {
        serde_json::from_str::<Value>(content).map_err(|e| format!("invalid JSON: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn resolves_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "event.schema.json", "{}");
        let resolved = resolve_schema_path(&path).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("event.schema.json"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_schema_path(Path::new("/definitely/not/here.schema.json")).unwrap_err();
        assert!(
            matches!(err, SchemaLoadError::NotFound { .. }),
            "expected NotFound, got: {err}"
        );
        assert!(err.to_string().contains("here.schema.json"));
    }

    #[test]
    fn blank_path_falls_back_to_default() {
        // Tests run from the crate directory; the default schema sits two levels up.
        let resolved = resolve_schema_path(Path::new("  ")).unwrap();
        assert!(resolved.ends_with(DEFAULT_SCHEMA_PATH));
    }

    #[test]
    fn relative_path_searches_parent_directories() {
        let resolved = resolve_schema_path(Path::new(DEFAULT_SCHEMA_PATH)).unwrap();
        assert!(resolved.is_file());
    }

    #[test]
    fn reads_json_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "s.json", r#"{"type": "object"}"#);
        let value = read_schema(&path).unwrap();
        assert_eq!(value["type"], "object");
    }

    #[test]
    fn reads_yaml_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "s.yaml",
            "type: object\nrequired:\n  - event_id\nproperties:\n  event_id:\n    type: string\n    minLength: 1\n",
        );
        let value = read_schema(&path).unwrap();
        assert_eq!(value["required"][0], "event_id");
        assert_eq!(value["properties"]["event_id"]["minLength"], 1);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.json", r#"{"type": "#);
        let err = read_schema(&path).unwrap_err();
        assert!(
            matches!(err, SchemaLoadError::Parse { .. }),
            "expected Parse, got: {err}"
        );
    }

    #[test]
    fn non_object_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "list.json", "[1, 2, 3]");
        let err = read_schema(&path).unwrap_err();
        assert!(matches!(err, SchemaLoadError::NotAnObject { .. }));
    }

    #[test]
    fn yaml_detection_by_extension() {
        assert!(is_yaml_path(Path::new("a/b.yaml")));
        assert!(is_yaml_path(Path::new("b.yml")));
        assert!(!is_yaml_path(Path::new("b.json")));
        assert!(!is_yaml_path(Path::new("b")));
    }
}
