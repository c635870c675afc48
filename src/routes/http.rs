// HTTP handlers: version, dashboard view, monitoring state and toggle

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/dashboard — the most recently published view.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.live.view())
}

/// GET /api/monitoring — running/stopped plus poller counters.
pub(super) async fn monitoring_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "state": state.live.monitoring(),
        "stats": state.stats.snapshot(),
    }))
}

/// POST /api/monitoring/toggle — stop or resume the collector and the poller.
pub(super) async fn toggle_handler(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.controller.lock().await.toggle().await;
    match result {
        Ok(monitoring) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({ "state": monitoring })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, operation = "toggle_monitoring", "Toggle failed");
            (
                StatusCode::BAD_GATEWAY,
                axum::Json(serde_json::json!({
                    "state": state.live.monitoring(),
                    "error": e.to_string(),
                })),
            )
        }
    }
}
