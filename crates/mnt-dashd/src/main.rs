mod router;
mod settings;
mod warehouse;

use std::sync::Arc;

use anyhow::Context;
use mnt_api::DashboardAdapter;
use mnt_core::{MetricsHandle, QueryOrchestrator};
use mnt_observe::{Journal, init_logger};
use mnt_prometheus::PrometheusMetrics;
use mnt_stream::{StreamController, StreamHandle, StreamSubscriber};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use crate::{settings::AppConfig, warehouse::LocalWarehouse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Configuration + logger
    let cfg = AppConfig::load().context("failed to load configuration")?;
    init_logger(&cfg.logger_config())?;
    info!("logger initialized");

    let query_cfg = cfg.query_config();
    query_cfg
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid query config: {e}"))?;

    // 2) Collaborators + metrics
    let metrics = PrometheusMetrics::new()?;
    let warehouse = Arc::new(LocalWarehouse::new(cfg.warehouse.capacity));
    info!(capacity = cfg.warehouse.capacity, "local warehouse ready");

    // 3) Query path
    let orchestrator = QueryOrchestrator::new(warehouse.clone(), query_cfg)
        .with_metrics(Arc::new(metrics.clone()) as MetricsHandle);

    // 4) Stream controller, initially idle
    let subscribers: Vec<Arc<dyn StreamSubscriber>> =
        vec![Arc::new(Journal::new()), Arc::new(metrics.clone())];
    let stream = StreamController::spawn(warehouse, cfg.stream_config(), subscribers)?;
    info!(stream = %cfg.stream.stream_name, "stream controller ready");

    // 5) HTTP
    let adapter = DashboardAdapter::new(Arc::new(orchestrator), stream.clone());
    let app = router::build(Arc::new(adapter), metrics, &cfg.http.allowed_origin)?;

    let listener = TcpListener::bind(&cfg.http.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.http.bind))?;
    info!(addr = %cfg.http.bind, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(stream))
        .await?;

    info!("server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, after the emitter has stopped.
async fn shutdown_signal(stream: StreamHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }

    if let Err(e) = stream.shutdown().await {
        warn!(error = %e, "stream controller already gone");
    }
}
