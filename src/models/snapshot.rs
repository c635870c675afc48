// Collector wire format (GET /api/metrics)

use serde::{Deserialize, Serialize};

/// Status marker the collector sends instead of metrics while paused.
pub const MONITORING_STOPPED_MESSAGE: &str = "Monitoring is stopped";

/// One decoded `/api/metrics` response.
///
/// Every field is optional: a paused collector answers with only `message`, and
/// a partial document must be detected by the ingestor rather than the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub cpu_percent: Option<f64>,
    #[serde(default)]
    pub memory_percent: Option<f64>,
    #[serde(default)]
    pub boot_time: Option<String>,
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default)]
    pub bytes_sent: Option<u64>,
    #[serde(default)]
    pub bytes_recv: Option<u64>,
    #[serde(default)]
    pub disk_usage_percent: Option<f64>,
    #[serde(default)]
    pub top_processes: Option<Vec<RawProcess>>,
    /// Bytes per second.
    #[serde(default)]
    pub upload_speed: Option<f64>,
    /// Bytes per second.
    #[serde(default)]
    pub download_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RawSnapshot {
    /// True when the collector reports that sampling is paused.
    pub fn is_monitoring_stopped(&self) -> bool {
        self.message.as_deref() == Some(MONITORING_STOPPED_MESSAGE)
    }

    /// The document a paused collector returns.
    pub fn stopped() -> Self {
        Self {
            message: Some(MONITORING_STOPPED_MESSAGE.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProcess {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub cpu_percent: Option<f64>,
    #[serde(default)]
    pub memory_percent: Option<f64>,
}
