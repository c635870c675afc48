use anyhow::Result;
use resmon::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        name = version::NAME,
        version = version::VERSION,
        collector = %app_config.collector.base_url,
        "Starting"
    );

    let collector = Arc::new(
        collector::HttpCollector::new(&app_config.collector.base_url)
            .map_err(|e| anyhow::anyhow!("collector client: {}", e))?,
    );
    let live = Arc::new(live::LiveState::new(
        ingest::MonitorState::new(app_config.dashboard.window_capacity),
        ingest::SnapshotIngestor::new(app_config.dashboard.time_format.clone()),
    ));

    let mut controller = poller::PollingController::new(
        collector,
        live.clone(),
        app_config.monitoring.poller(),
    );
    controller.begin_polling();
    let poll_stats = controller.stats();
    let controller = Arc::new(tokio::sync::Mutex::new(controller));

    let ws_dashboard_connections = Arc::new(AtomicUsize::new(0));
    let stats_logger = poller::spawn_stats_logger(
        poll_stats.clone(),
        live.clone(),
        ws_dashboard_connections.clone(),
        std::time::Duration::from_secs(app_config.monitoring.stats_log_interval_secs),
    );

    let app = routes::app(
        live,
        controller.clone(),
        poll_stats,
        ws_dashboard_connections,
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
        }
    }

    controller.lock().await.shutdown();
    stats_logger.abort();
    Ok(())
}
