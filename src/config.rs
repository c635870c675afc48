use serde::Deserialize;

use crate::buffer::WINDOW_CAPACITY;
use crate::ingest::{DEFAULT_TIME_FORMAT, is_valid_time_format};
use crate::poller::PollerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collector: CollectorConfig,
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Collector root, e.g. "http://127.0.0.1:5000".
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Skip a tick while a /api/metrics request from the current run is unresolved
    /// (at most one tick in a row).
    #[serde(default = "default_coalesce_in_flight")]
    pub coalesce_in_flight: bool,
    /// How often to log app stats (ws_dashboard clients, ticks, snapshots) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Samples kept per chart.
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    /// chrono strftime pattern for chart labels.
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
            time_format: default_time_format(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_coalesce_in_flight() -> bool {
    true
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

fn default_window_capacity() -> usize {
    WINDOW_CAPACITY
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

impl MonitoringConfig {
    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            interval: std::time::Duration::from_millis(self.poll_interval_ms),
            coalesce_in_flight: self.coalesce_in_flight,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        let base_url = reqwest::Url::parse(&self.collector.base_url).map_err(|e| {
            anyhow::anyhow!(
                "collector.base_url must be an absolute URL, got {:?}: {}",
                self.collector.base_url,
                e
            )
        })?;
        anyhow::ensure!(
            matches!(base_url.scheme(), "http" | "https"),
            "collector.base_url must use http or https, got {}",
            base_url.scheme()
        );
        anyhow::ensure!(
            self.monitoring.poll_interval_ms > 0,
            "monitoring.poll_interval_ms must be > 0, got {}",
            self.monitoring.poll_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.dashboard.window_capacity > 0,
            "dashboard.window_capacity must be > 0, got {}",
            self.dashboard.window_capacity
        );
        anyhow::ensure!(
            is_valid_time_format(&self.dashboard.time_format),
            "dashboard.time_format is not a valid strftime pattern: {:?}",
            self.dashboard.time_format
        );
        Ok(())
    }
}
