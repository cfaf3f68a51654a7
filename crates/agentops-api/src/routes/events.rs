//! # Event Ingest Route
//!
//! `POST /v1/events` accepts one agent telemetry event per request.
//!
//! ## Pipeline
//!
//! 1. Buffer the body, capped at [`MAX_EVENT_BODY_BYTES`].
//! 2. Decode exactly one JSON value; empty bodies and trailing data are
//!    rejected as `invalid_json`.
//! 3. Run the configured validator; any violation rejects the whole event.
//! 4. Require the conforming value to be an object.
//! 5. Persist through the event store and answer 202 with whether the
//!    event was new.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_EVENT_BODY_BYTES: usize = 1 << 20;

const EMPTY_BODY_MESSAGE: &str = "request body is empty";
const SINGLE_VALUE_MESSAGE: &str = "request body must contain a single JSON object";

/// Body of a 202 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    /// Always `"accepted"`.
    pub status: String,
    /// `false` when an event with the same `event_id` was already stored.
    pub persisted: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/events",
        post(ingest_event).layer(DefaultBodyLimit::max(MAX_EVENT_BODY_BYTES)),
    )
}

async fn ingest_event(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Accepted>), AppError> {
    let payload = decode_single_value(&body?)?;

    let violations = state.validator.validate(&payload);
    if !violations.is_empty() {
        return Err(AppError::ValidationFailed(violations));
    }

    let Value::Object(event) = payload else {
        return Err(AppError::InvalidPayloadType);
    };

    let persisted = state
        .store
        .insert_event(&event)
        .await
        .map_err(|e| AppError::PersistFailed(e.to_string()))?;

    if !persisted {
        tracing::debug!(
            event_id = event.get("event_id").and_then(serde_json::Value::as_str).unwrap_or_default(),
            "duplicate event ignored"
        );
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(Accepted {
            status: "accepted".to_string(),
            persisted,
        }),
    ))
}

/// Decode a body holding exactly one JSON value, surrounded by optional
/// whitespace.
pub fn decode_single_value(body: &[u8]) -> Result<Value, AppError> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Value>();

    let payload = match values.next() {
        Some(Ok(value)) => value,
        Some(Err(e)) => return Err(AppError::InvalidJson(e.to_string())),
        None => return Err(AppError::InvalidJson(EMPTY_BODY_MESSAGE.to_string())),
    };

    match values.next() {
        None => Ok(payload),
        Some(_) => Err(AppError::InvalidJson(SINGLE_VALUE_MESSAGE.to_string())),
    }
}
