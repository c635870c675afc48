// WebSocket handler: pushes every published dashboard view

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::DashboardView;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the dashboard connection count on drop (connect = +1, drop = -1).
struct WsDashboardGuard(Arc<AtomicUsize>);

impl Drop for WsDashboardGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

pub(super) async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let rx = state.live.subscribe();
    let conn_count = state.ws_dashboard_connections.clone();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_dashboard(socket, rx, conn_count).await {
            tracing::info!("Dashboard stream error: {}", e);
        }
    })
}

async fn send_view(socket: &mut WebSocket, view: &DashboardView) -> anyhow::Result<bool> {
    let json = serde_json::to_string(view)?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_dashboard(
    mut socket: WebSocket,
    mut rx: watch::Receiver<DashboardView>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    conn_count.fetch_add(1, Ordering::Relaxed);
    let _guard = WsDashboardGuard(conn_count);
    tracing::info!("Client connected to dashboard stream");

    let current = rx.borrow_and_update().clone();
    if !send_view(&mut socket, &current).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ping_interval.tick().await;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = rx.borrow_and_update().clone();
                if !send_view(&mut socket, &view).await? {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    tracing::info!("Client disconnected from dashboard stream");
    Ok(())
}
