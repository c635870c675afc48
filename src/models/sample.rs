// Windowed samples (one per accepted tick)

use serde::{Deserialize, Serialize};

/// Anything kept in a history window carries its display time.
pub trait Timestamped {
    fn timestamp(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

/// Network throughput in megabytes per second, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpeedSample {
    pub timestamp: String,
    #[serde(rename = "uploadMBps")]
    pub upload_mbps: f64,
    #[serde(rename = "downloadMBps")]
    pub download_mbps: f64,
}

impl Timestamped for Sample {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

impl Timestamped for NetworkSpeedSample {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }
}
