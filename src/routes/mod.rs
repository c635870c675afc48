// HTTP + WebSocket routes for the dashboard view layer

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::live::LiveState;
use crate::poller::{PollStats, PollingController};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) live: Arc<LiveState>,
    pub(crate) controller: Arc<Mutex<PollingController>>,
    /// Read without the controller lock, which a pending toggle holds.
    pub(crate) stats: Arc<PollStats>,
    pub(crate) ws_dashboard_connections: Arc<AtomicUsize>,
}

pub fn app(
    live: Arc<LiveState>,
    controller: Arc<Mutex<PollingController>>,
    stats: Arc<PollStats>,
    ws_dashboard_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        live,
        controller,
        stats,
        ws_dashboard_connections,
    };
    Router::new()
        .route("/", get(|| async { "resmon: dynamic resource monitor" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/dashboard", get(http::dashboard_handler)) // GET /api/dashboard
        .route("/api/monitoring", get(http::monitoring_handler)) // GET /api/monitoring
        .route("/api/monitoring/toggle", post(http::toggle_handler)) // POST /api/monitoring/toggle
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
