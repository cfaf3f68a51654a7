//! # Validate Subcommand
//!
//! Checks event payload files against the event schema, the same check
//! `POST /v1/events` runs before accepting an event.
//!
//! Text output prints one `file: path: message` line per violation and an
//! `OK: file` line per conforming payload. JSON output prints an array of
//! `{file, valid, errors}` objects; unreadable files also carry `error`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use agentops_schema::load::{is_yaml_path, parse_document};
use agentops_schema::{EventValidator, Violation, DEFAULT_SCHEMA_PATH};

/// Output rendering for validation results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the `agentops validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file (JSON or YAML). Relative paths are also searched in
    /// parent directories.
    #[arg(long, default_value = DEFAULT_SCHEMA_PATH)]
    pub schema: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Payload files to validate (`.json`, `.yaml` or `.yml`).
    #[arg(value_name = "PAYLOAD", required = true)]
    pub payloads: Vec<PathBuf>,
}

/// Validation result for one payload file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub valid: bool,
    pub errors: Vec<Violation>,
    /// Set when the file could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    fn unreadable(file: String, error: String) -> Self {
        Self {
            file,
            valid: false,
            errors: Vec::new(),
            error: Some(error),
        }
    }
}

/// Every payload conforms.
pub const EXIT_OK: u8 = 0;
/// At least one payload is invalid or unreadable.
pub const EXIT_INVALID: u8 = 1;
/// The schema could not be loaded; no payload was checked.
pub const EXIT_SCHEMA_ERROR: u8 = 2;

/// Execute the validate subcommand, writing results to `out`.
///
/// Returns [`EXIT_OK`], [`EXIT_INVALID`] or [`EXIT_SCHEMA_ERROR`]. Only
/// failures to write the report are returned as errors.
pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<u8> {
    let validator = match EventValidator::new(&args.schema) {
        Ok(validator) => validator,
        Err(e) => {
            tracing::error!(
                schema = %args.schema.display(),
                error = %e,
                "failed to load event schema"
            );
            return Ok(EXIT_SCHEMA_ERROR);
        }
    };
    if let Some(source) = validator.source() {
        tracing::info!(schema = %source.display(), "loaded event schema");
    }

    let outcomes: Vec<FileOutcome> = args
        .payloads
        .iter()
        .map(|path| check_file(&validator, path))
        .collect();

    match args.format {
        OutputFormat::Text => write_text(&outcomes, out).context("failed to write report")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &outcomes)
                .context("failed to write JSON report")?;
            writeln!(out).context("failed to write JSON report")?;
        }
    }

    let failed = outcomes.iter().filter(|o| !o.valid).count();
    tracing::info!(total = outcomes.len(), failed, "validation finished");

    Ok(if failed > 0 { EXIT_INVALID } else { EXIT_OK })
}

/// Read, parse and validate one payload file.
pub fn check_file(validator: &EventValidator, path: &Path) -> FileOutcome {
    let file = path.display().to_string();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return FileOutcome::unreadable(file, format!("read failed: {e}")),
    };

    let payload: Value = match parse_document(&content, is_yaml_path(path)) {
        Ok(value) => value,
        Err(reason) => return FileOutcome::unreadable(file, reason),
    };

    let errors = validator.validate(&payload);
    FileOutcome {
        file,
        valid: errors.is_empty(),
        errors,
        error: None,
    }
}

fn write_text(outcomes: &[FileOutcome], out: &mut dyn Write) -> Result<()> {
    for outcome in outcomes {
        if let Some(error) = &outcome.error {
            writeln!(out, "{}: {}", outcome.file, error)?;
        } else if outcome.valid {
            writeln!(out, "OK: {}", outcome.file)?;
        } else {
            for violation in &outcome.errors {
                writeln!(out, "{}: {}", outcome.file, violation)?;
            }
        }
    }
    Ok(())
}
