//! End-to-end tests for `agentops validate` against the bundled event schema.

use std::io::Write;
use std::path::{Path, PathBuf};

use agentops_cli::validate::{run_validate, OutputFormat, ValidateArgs, EXIT_SCHEMA_ERROR};
use agentops_schema::DEFAULT_SCHEMA_PATH;
use serde_json::{json, Value};

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop();
    dir.pop();
    dir
}

fn run_started() -> Value {
    json!({
        "event_version": "v0",
        "event_id": "f47ac10b-58cc-4372-a567-0e02b2c3d479",
        "event_type": "run.started",
        "occurred_at": "2026-02-07T21:00:00Z",
        "tenant": {"tenant_id": "t-1", "workspace_id": "w-1", "project_id": "p-1"},
        "run": {"run_id": "r-1", "agent_id": "a-1", "workflow_id": "wf-1"},
        "trace": {"trace_id": "tr-1", "span_id": "sp-1"}
    })
}

fn write_payload(dir: &Path, name: &str, payload: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(payload).unwrap()).unwrap();
    path
}

fn args(payloads: Vec<PathBuf>, format: OutputFormat) -> ValidateArgs {
    ValidateArgs {
        schema: repo_root().join(DEFAULT_SCHEMA_PATH),
        format,
        payloads,
    }
}

fn run(args: &ValidateArgs) -> (u8, String) {
    let mut out = Vec::new();
    let code = run_validate(args, &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_valid_payload_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_payload(dir.path(), "ok.json", &run_started());

    let (code, output) = run(&args(vec![path.clone()], OutputFormat::Text));
    assert_eq!(code, 0);
    assert_eq!(output, format!("OK: {}\n", path.display()));
}

#[test]
fn test_invalid_payload_exits_one_with_paths() {
    let dir = tempfile::tempdir().unwrap();
    let mut event = run_started();
    event["event_type"] = json!("run.failed");
    event["run"]["latency_ms"] = json!(-1);
    let path = write_payload(dir.path(), "bad.json", &event);

    let (code, output) = run(&args(vec![path.clone()], OutputFormat::Text));
    assert_eq!(code, 1);
    let file = path.display();
    assert!(
        output.contains(&format!("{file}: $.run.latency_ms: must be >= 0")),
        "{output}"
    );
    assert!(
        output.contains(&format!("{file}: $.error: is required")),
        "{output}"
    );
}

#[test]
fn test_json_format_reports_each_file() {
    let dir = tempfile::tempdir().unwrap();
    let ok = write_payload(dir.path(), "ok.json", &run_started());
    let missing = dir.path().join("missing.json");

    let (code, output) = run(&args(vec![ok.clone(), missing.clone()], OutputFormat::Json));
    assert_eq!(code, 1);

    let report: Value = serde_json::from_str(&output).unwrap();
    let entries = report.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["file"], ok.display().to_string());
    assert_eq!(entries[0]["valid"], true);
    assert_eq!(entries[0]["errors"], json!([]));
    assert_eq!(entries[1]["valid"], false);
    assert!(entries[1]["error"].as_str().unwrap().starts_with("read failed"));
}

#[test]
fn test_missing_schema_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_payload(dir.path(), "ok.json", &run_started());
    let args = ValidateArgs {
        schema: dir.path().join("no-such.schema.json"),
        format: OutputFormat::Text,
        payloads: vec![path],
    };

    let (code, output) = run(&args);
    assert_eq!(code, EXIT_SCHEMA_ERROR);
    assert!(output.is_empty(), "{output}");
}

/// Writer whose every write fails.
struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_is_an_error_not_a_schema_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_payload(dir.path(), "ok.json", &run_started());

    for format in [OutputFormat::Text, OutputFormat::Json] {
        let err =
            run_validate(&args(vec![path.clone()], format), &mut ClosedPipe).unwrap_err();
        assert!(format!("{err:#}").contains("failed to write"), "{err:#}");
    }
}
