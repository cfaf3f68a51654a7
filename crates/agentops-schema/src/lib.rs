//! # agentops-schema: Event Schema Validation
//!
//! Validates decoded agent telemetry events against a declarative schema
//! before they are accepted into the ingest pipeline.
//!
//! ## Runtime Validation (`validate`)
//!
//! [`EventValidator`] owns one schema document, loaded once at construction
//! and never mutated. [`EventValidator::validate`] walks the schema and the
//! payload in lock-step and returns every path-tagged [`Violation`] it finds.
//! An empty result means the payload conforms.
//!
//! Supported keywords: `type`, `enum`, `const`, `minimum`, `minLength`,
//! `format` (`date-time`, `uuid`), `required`, `properties`,
//! `additionalProperties` and `allOf` entries carrying `if`/`then`.
//! Unknown keywords are ignored.
//!
//! ## Loading (`load`)
//!
//! Schema documents are JSON or YAML files. Relative paths are searched
//! upwards from the working directory so the service and its tests can run
//! from any crate directory.
//!
//! ## Crate Policy
//!
//! - No I/O after construction. `validate` is pure and deterministic.
//! - Payload nonconformance is always a violation, never an error.
//!   Only schema loading can fail.

pub mod coerce;
pub mod format;
pub mod load;
pub mod validate;

pub use load::{SchemaLoadError, DEFAULT_SCHEMA_PATH};
pub use validate::{
    EventValidator, PayloadValidator, ValidationReport, Violation, NOT_CONFIGURED_MESSAGE,
    ROOT_PATH,
};
