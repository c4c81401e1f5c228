//! HTTP server exposing the home page and the conversion endpoint.

pub mod routes;

use crate::core::config::ServerConfig;
use crate::core::forex::Forex;
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub fn router(forex: Arc<Forex>) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/conv", get(routes::convert))
        .with_state(forex)
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, forex: Arc<Forex>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(listen = %addr, "Conversion server listening");

    axum::serve(listener, router(forex))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Conversion server failed")?;

    info!("Conversion server stopped");
    Ok(())
}

/// Binds `config.bind` and serves until ctrl-c.
pub async fn serve(config: &ServerConfig, forex: Arc<Forex>) -> Result<()> {
    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    run(listener, forex, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {e}. Shutting down");
        }
    })
    .await
}
