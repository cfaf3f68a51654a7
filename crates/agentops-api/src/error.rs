//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every error response is a JSON object with a machine-readable `error`
//! code, plus a `message` or the list of schema violations under `errors`.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agentops_schema::Violation;

/// Message returned when a conforming payload is not a JSON object.
pub const NOT_AN_OBJECT_MESSAGE: &str = "request body must be a JSON object";

/// JSON error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "invalid_json", "validation_failed").
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Schema violations, present only for `validation_failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Violation>>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Body is not exactly one well-formed JSON value (400).
    #[error("invalid json: {0}")]
    InvalidJson(String),

    /// Body exceeds the configured limit (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Payload does not conform to the event schema (400).
    #[error("validation failed with {} violation(s)", .0.len())]
    ValidationFailed(Vec<Violation>),

    /// Payload conforms but is not an object (400).
    #[error("invalid payload type: {NOT_AN_OBJECT_MESSAGE}")]
    InvalidPayloadType,

    /// The event store rejected or failed the write (500).
    #[error("persist failed: {0}")]
    PersistFailed(String),

    /// A dependency is not ready to serve traffic (503).
    #[error("not ready: {0}")]
    NotReady(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidJson(_) => (StatusCode::BAD_REQUEST, "invalid_json"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            Self::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            Self::InvalidPayloadType => (StatusCode::BAD_REQUEST, "invalid_payload_type"),
            Self::PersistFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persist_failed"),
            Self::NotReady(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
        }
    }

    fn into_body(self, code: &str) -> ErrorBody {
        let (message, errors) = match self {
            Self::ValidationFailed(violations) => (None, Some(violations)),
            Self::InvalidPayloadType => (Some(NOT_AN_OBJECT_MESSAGE.to_string()), None),
            Self::InvalidJson(msg)
            | Self::PayloadTooLarge(msg)
            | Self::PersistFailed(msg)
            | Self::NotReady(msg) => (Some(msg), None),
        };
        ErrorBody {
            error: code.to_string(),
            message,
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            Self::PersistFailed(_) => tracing::error!(error = %self, "event persist failed"),
            Self::NotReady(_) => tracing::warn!(error = %self, "readiness check failed"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        (status, Json(self.into_body(code))).into_response()
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::InvalidJson(rejection.body_text())
        }
    }
}
