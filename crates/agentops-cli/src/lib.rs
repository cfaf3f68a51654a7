//! # agentops-cli: Event Payload Tooling
//!
//! Offline counterpart of the ingest service: checks payload files against
//! the same schema the service enforces, so producers can test events
//! before sending them.
//!
//! ## Subcommands
//!
//! - `validate`: validate JSON or YAML payload files against the event schema
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the `*Args` structs, handlers in `run_*`.
//! - Handlers return an exit code; only output failures are errors.

pub mod validate;
