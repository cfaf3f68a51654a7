//! # Server Runtime
//!
//! Binds the listener, serves the router, and drives graceful shutdown.
//!
//! On a stop signal the server stops accepting connections and drains
//! in-flight requests. If draining outlasts the configured timeout the
//! server task is aborted and [`serve`] returns an error.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agentops_schema::EventValidator;
use anyhow::{anyhow, bail, Context};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::ServiceConfig;
use crate::state::AppState;
use crate::store::InMemoryEventStore;

/// Load the schema, bind `0.0.0.0:PORT` and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Fails if the schema cannot be loaded, the port cannot be bound, or the
/// server does not stop within `shutdown_timeout`.
pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let validator =
        EventValidator::new(&config.schema_path).context("initialize event validator")?;
    if let Some(source) = validator.source() {
        tracing::info!(schema_path = %source.display(), "schema_loaded");
    }

    let state = AppState::new(Arc::new(validator), Arc::new(InMemoryEventStore::new()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %addr, env = %config.env, "server_starting");

    serve(listener, state, config.shutdown_timeout, shutdown_signal()).await
}

/// Serve `state` on `listener` until `shutdown` resolves, then drain for at
/// most `shutdown_timeout`. The value `shutdown` resolves to is logged as
/// the shutdown reason.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown_timeout: Duration,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = &'static str> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, crate::app(state)).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut task = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut task => {
            return match joined {
                Ok(result) => result.context("server exited"),
                Err(e) => Err(anyhow!("server task failed: {e}")),
            };
        }
        reason = shutdown => {
            tracing::info!(reason, "server_shutdown_requested");
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(shutdown_timeout, &mut task).await {
        Ok(Ok(result)) => result.context("server error during shutdown")?,
        Ok(Err(e)) => bail!("server task failed: {e}"),
        Err(_) => {
            task.abort();
            bail!("graceful shutdown timed out after {shutdown_timeout:?}");
        }
    }

    tracing::info!("server_stopped");
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM. Returns the signal name.
pub async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "interrupt",
            Err(e) => {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "terminate"
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        reason = interrupt => reason,
        reason = terminate => reason,
    }
}
