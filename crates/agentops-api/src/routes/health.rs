//! # Health Probes
//!
//! - `GET /healthz`: liveness, 200 while the process is running
//! - `GET /readyz`: readiness, 200 once the event store accepts writes

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Body of both probe responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStatus {
    pub status: String,
}

impl ProbeStatus {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
}

async fn liveness() -> Json<ProbeStatus> {
    Json(ProbeStatus::new("ok"))
}

async fn readiness(State(state): State<AppState>) -> Result<Json<ProbeStatus>, AppError> {
    state
        .store
        .ready()
        .await
        .map_err(|e| AppError::NotReady(e.to_string()))?;
    Ok(Json(ProbeStatus::new("ready")))
}
