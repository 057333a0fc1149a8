//! Load average exporter
//!
//! Samples host load averages from /proc/loadavg every few seconds and
//! serves them as prometheus gauges over HTTP.

use anyhow::{Context, Result};
use exporter_lib::{
    health::{components, HealthRegistry},
    sampler::{ProcLoadSource, SamplerConfig, SamplerLoop},
    store::LoadGauges,
};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting load-exporter");

    // Load configuration
    let config = config::ExporterConfig::load()?;
    info!(
        port = config.port,
        interval_secs = config.sample_interval_secs,
        loadavg_path = %config.loadavg_path,
        "Exporter configured"
    );

    // Explicitly constructed registry and gauge store, injected into both
    // the sampler and the API
    let registry = Registry::new();
    let gauges = LoadGauges::register(&registry).context("Failed to register load gauges")?;

    // Health tracking
    let health = HealthRegistry::new();
    health.register(components::SAMPLER).await;

    // Start the background sampler with a supervised shutdown channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let sampler = SamplerLoop::new(
        Arc::new(ProcLoadSource::with_path(&config.loadavg_path)),
        gauges,
        health.clone(),
        SamplerConfig {
            interval: Duration::from_secs(config.sample_interval_secs),
        },
    );
    let sampler_handle = tokio::spawn(sampler.run(shutdown_rx));

    // Bind before marking ready; a bind failure aborts startup
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind metrics endpoint on {}", addr))?;
    info!(addr = %addr, "Serving metrics endpoint");

    let app_state = Arc::new(api::AppState::new(registry, health.clone()));
    let mut server_handle = tokio::spawn(async move {
        axum::serve(listener, api::create_router(app_state)).await
    });

    health.set_ready(true).await;

    // Run until a shutdown signal arrives or the server dies, then stop
    // the sampler and join it
    let outcome = supervise(
        async {
            let _ = tokio::signal::ctrl_c().await;
            info!("SIGINT received, shutting down");
        },
        &mut server_handle,
    )
    .await;

    let _ = shutdown_tx.send(());
    sampler_handle.await.context("Sampler task panicked")?;
    server_handle.abort();

    outcome
}

/// Wait for either the shutdown signal or the server task to exit
///
/// The server has no reason to return while the process is healthy, so
/// its exit is an error even when the task itself reports success.
async fn supervise(
    signal: impl std::future::Future<Output = ()>,
    server: &mut tokio::task::JoinHandle<std::io::Result<()>>,
) -> Result<()> {
    tokio::select! {
        _ = signal => Ok(()),
        result = server => Err(match result {
            Ok(Ok(())) => anyhow::anyhow!("Metrics server exited unexpectedly"),
            Ok(Err(e)) => anyhow::Error::new(e).context("Metrics server failed"),
            Err(e) => anyhow::Error::new(e).context("Metrics server task panicked"),
        }),
    }
}
