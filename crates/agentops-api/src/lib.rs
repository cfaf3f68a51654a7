//! # agentops-api: Event Ingest Service
//!
//! Axum service that accepts agent telemetry events, validates them
//! against the event schema, and hands conforming events to an
//! [`store::EventStore`].
//!
//! ## API Surface
//!
//! | Route             | Module               | Purpose               |
//! |-------------------|----------------------|-----------------------|
//! | `GET /healthz`    | [`routes::health`]   | Liveness probe        |
//! | `GET /readyz`     | [`routes::health`]   | Readiness probe       |
//! | `POST /v1/events` | [`routes::events`]   | Validate and persist  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → log_request → Handler
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod telemetry;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use crate::config::ServiceConfig;
pub use crate::server::{run, serve};
pub use crate::state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::events::router())
        .layer(from_fn(middleware::log_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
