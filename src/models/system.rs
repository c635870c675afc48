// Latest-value models and monitoring state

use serde::{Deserialize, Serialize};

/// Boot time and uptime exactly as the collector reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub boot_time: String,
    pub uptime: String,
}

/// Cumulative interface totals in megabytes, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkTotals {
    #[serde(rename = "sentMB")]
    pub sent_mb: f64,
    #[serde(rename = "receivedMB")]
    pub received_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub name: String,
    pub pid: u32,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Polling lifecycle; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringState {
    #[default]
    Running,
    Stopped,
}

impl MonitoringState {
    pub fn is_running(self) -> bool {
        self == MonitoringState::Running
    }
}

impl std::fmt::Display for MonitoringState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitoringState::Running => f.write_str("running"),
            MonitoringState::Stopped => f.write_str("stopped"),
        }
    }
}
