//! # agentops-api: Binary Entry Point
//!
//! Reads configuration from the environment, installs JSON logging and
//! serves the ingest API until stopped.

use anyhow::Context;

use agentops_api::{config::ServiceConfig, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("failed to load config")?;
    telemetry::init(config.log_level)?;

    agentops_api::run(config).await.map_err(|e| {
        tracing::error!(error = %format!("{e:#}"), "service_exit_error");
        e
    })
}
