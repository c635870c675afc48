// Render model consumed by the view layer (GET /api/dashboard, WS /ws/dashboard)

use serde::{Deserialize, Serialize};

use super::{MonitoringState, ProcessInfo};
use crate::ingest::MonitorState;
use crate::series::build_series;
use crate::uptime::{NOT_AVAILABLE, format_uptime};

pub const CPU_SERIES_LABEL: &str = "CPU Usage (%)";
pub const MEMORY_SERIES_LABEL: &str = "Memory Usage (%)";
pub const UPLOAD_SERIES_LABEL: &str = "Upload Speed (MBps)";
pub const DOWNLOAD_SERIES_LABEL: &str = "Download Speed (MBps)";

/// One chart: display-time labels and the values plotted against them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoView {
    pub boot_time: String,
    pub uptime: String,
    /// Human uptime phrase, "N/A" when nothing is known yet.
    pub uptime_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTotalsView {
    #[serde(rename = "sentMB")]
    pub sent_mb: f64,
    #[serde(rename = "receivedMB")]
    pub received_mb: f64,
    /// `sent_mb` with two decimals, e.g. "12.50".
    pub sent_text: String,
    pub received_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub monitoring: MonitoringState,
    pub cpu: ChartSeries,
    pub memory: ChartSeries,
    pub upload: ChartSeries,
    pub download: ChartSeries,
    pub system_info: SystemInfoView,
    pub network: NetworkTotalsView,
    pub disk_usage_percent: f64,
    pub top_processes: Vec<ProcessInfo>,
}

impl DashboardView {
    pub fn from_state(state: &MonitorState) -> Self {
        let uptime_text = match format_uptime(Some(state.system_info.uptime.as_str())) {
            text if text.is_empty() => NOT_AVAILABLE.to_string(),
            text => text,
        };
        let boot_time = if state.system_info.boot_time.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            state.system_info.boot_time.clone()
        };

        Self {
            monitoring: state.monitoring,
            cpu: build_series(&state.usage_history, CPU_SERIES_LABEL, |s| s.cpu_usage),
            memory: build_series(&state.usage_history, MEMORY_SERIES_LABEL, |s| {
                s.memory_usage
            }),
            upload: build_series(&state.speed_history, UPLOAD_SERIES_LABEL, |s| {
                s.upload_mbps
            }),
            download: build_series(&state.speed_history, DOWNLOAD_SERIES_LABEL, |s| {
                s.download_mbps
            }),
            system_info: SystemInfoView {
                boot_time,
                uptime: state.system_info.uptime.clone(),
                uptime_text,
            },
            network: NetworkTotalsView {
                sent_mb: state.network_totals.sent_mb,
                received_mb: state.network_totals.received_mb,
                sent_text: format!("{:.2}", state.network_totals.sent_mb),
                received_text: format!("{:.2}", state.network_totals.received_mb),
            },
            disk_usage_percent: state.disk_usage_percent,
            top_processes: state.top_processes.clone(),
        }
    }
}
