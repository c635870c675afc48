// Snapshot ingestion: validate one collector response, then apply it to the live state
// in full or not at all.

use std::collections::HashSet;

use chrono::format::{Item, StrftimeItems};
use thiserror::Error;

use crate::buffer::{SampleBuffer, WINDOW_CAPACITY};
use crate::models::{
    MonitoringState, NetworkSpeedSample, NetworkTotals, ProcessInfo, RawProcess, RawSnapshot,
    Sample, SystemInfo,
};

/// Default label format for chart timestamps, e.g. "3:04:05 PM".
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M:%S %p";

const BYTES_PER_MEGABYTE: f64 = 1_000_000.0;

/// Bytes to megabytes (10^6), rounded to 2 decimals.
pub fn bytes_to_megabytes(bytes: f64) -> f64 {
    (bytes / BYTES_PER_MEGABYTE * 100.0).round() / 100.0
}

/// True when `format` is a strftime pattern chrono can render.
pub fn is_valid_time_format(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Outcome of a well-formed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Applied,
    /// The collector reported "Monitoring is stopped"; nothing was changed.
    Discarded,
}

impl IngestOutcome {
    pub fn applied(self) -> bool {
        self == IngestOutcome::Applied
    }
}

/// A snapshot that cannot be applied without leaving partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("snapshot is missing field `{0}`")]
    MissingField(&'static str),
    #[error("top_processes[{index}] is missing field `{field}`")]
    MissingProcessField { index: usize, field: &'static str },
    #[error("pid {0} appears more than once in top_processes")]
    DuplicatePid(u32),
}

/// Everything the dashboard shows. Windowed histories plus latest values.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorState {
    pub monitoring: MonitoringState,
    pub usage_history: SampleBuffer<Sample>,
    pub speed_history: SampleBuffer<NetworkSpeedSample>,
    pub system_info: SystemInfo,
    pub network_totals: NetworkTotals,
    pub disk_usage_percent: f64,
    pub top_processes: Vec<ProcessInfo>,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(WINDOW_CAPACITY)
    }
}

impl MonitorState {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            monitoring: MonitoringState::Running,
            usage_history: SampleBuffer::with_capacity(window_capacity),
            speed_history: SampleBuffer::with_capacity(window_capacity),
            system_info: SystemInfo::default(),
            network_totals: NetworkTotals::default(),
            disk_usage_percent: 0.0,
            top_processes: Vec::new(),
        }
    }
}

/// Turns collector snapshots into state updates.
#[derive(Debug, Clone)]
pub struct SnapshotIngestor {
    time_format: String,
}

impl Default for SnapshotIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_FORMAT)
    }
}

impl SnapshotIngestor {
    /// A `time_format` that fails [`is_valid_time_format`] is replaced by
    /// [`DEFAULT_TIME_FORMAT`], so stamping a sample never fails.
    pub fn new(time_format: impl Into<String>) -> Self {
        let mut time_format = time_format.into();
        if !is_valid_time_format(&time_format) {
            tracing::warn!(
                time_format = %time_format,
                fallback = DEFAULT_TIME_FORMAT,
                "Invalid time format; using default"
            );
            time_format = DEFAULT_TIME_FORMAT.to_string();
        }
        Self { time_format }
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    /// Ingests `raw`, stamping accepted samples with the current local time.
    pub fn ingest(
        &self,
        state: &mut MonitorState,
        raw: RawSnapshot,
    ) -> Result<IngestOutcome, IngestError> {
        let now = chrono::Local::now().format(&self.time_format).to_string();
        self.ingest_at(state, raw, &now)
    }

    /// Ingests `raw` with an explicit display timestamp.
    pub fn ingest_at(
        &self,
        state: &mut MonitorState,
        raw: RawSnapshot,
        timestamp: &str,
    ) -> Result<IngestOutcome, IngestError> {
        if raw.is_monitoring_stopped() {
            return Ok(IngestOutcome::Discarded);
        }
        let update = NormalizedSnapshot::try_from(raw)?;
        update.apply(state, timestamp);
        Ok(IngestOutcome::Applied)
    }
}

/// A fully validated snapshot, already converted to display units.
struct NormalizedSnapshot {
    cpu_percent: f64,
    memory_percent: f64,
    system_info: SystemInfo,
    totals: NetworkTotals,
    disk_usage_percent: f64,
    processes: Vec<ProcessInfo>,
    upload_mbps: f64,
    download_mbps: f64,
}

impl TryFrom<RawSnapshot> for NormalizedSnapshot {
    type Error = IngestError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let cpu_percent = required(raw.cpu_percent, "cpu_percent")?;
        let memory_percent = required(raw.memory_percent, "memory_percent")?;
        let boot_time = required(raw.boot_time, "boot_time")?;
        let uptime = required(raw.uptime, "uptime")?;
        let bytes_sent = required(raw.bytes_sent, "bytes_sent")?;
        let bytes_recv = required(raw.bytes_recv, "bytes_recv")?;
        let disk_usage_percent = required(raw.disk_usage_percent, "disk_usage_percent")?;
        let top_processes = required(raw.top_processes, "top_processes")?;
        let upload_speed = required(raw.upload_speed, "upload_speed")?;
        let download_speed = required(raw.download_speed, "download_speed")?;

        let mut seen = HashSet::with_capacity(top_processes.len());
        let processes = top_processes
            .into_iter()
            .enumerate()
            .map(|(index, p)| {
                let process = normalize_process(index, p)?;
                if !seen.insert(process.pid) {
                    return Err(IngestError::DuplicatePid(process.pid));
                }
                Ok(process)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cpu_percent,
            memory_percent,
            system_info: SystemInfo { boot_time, uptime },
            totals: NetworkTotals {
                sent_mb: bytes_to_megabytes(bytes_sent as f64),
                received_mb: bytes_to_megabytes(bytes_recv as f64),
            },
            disk_usage_percent,
            processes,
            upload_mbps: bytes_to_megabytes(upload_speed),
            download_mbps: bytes_to_megabytes(download_speed),
        })
    }
}

impl NormalizedSnapshot {
    fn apply(self, state: &mut MonitorState, timestamp: &str) {
        state.usage_history.append(Sample {
            timestamp: timestamp.to_string(),
            cpu_usage: self.cpu_percent,
            memory_usage: self.memory_percent,
        });
        state.speed_history.append(NetworkSpeedSample {
            timestamp: timestamp.to_string(),
            upload_mbps: self.upload_mbps,
            download_mbps: self.download_mbps,
        });
        state.system_info = self.system_info;
        state.network_totals = self.totals;
        state.disk_usage_percent = self.disk_usage_percent;
        state.top_processes = self.processes;
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, IngestError> {
    value.ok_or(IngestError::MissingField(field))
}

fn normalize_process(index: usize, raw: RawProcess) -> Result<ProcessInfo, IngestError> {
    let missing = |field| IngestError::MissingProcessField { index, field };
    Ok(ProcessInfo {
        name: raw.name.ok_or_else(|| missing("name"))?,
        pid: raw.pid.ok_or_else(|| missing("pid"))?,
        cpu_percent: raw.cpu_percent.ok_or_else(|| missing("cpu_percent"))?,
        memory_percent: raw.memory_percent.ok_or_else(|| missing("memory_percent"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn megabytes_round_to_two_decimals() {
        assert_eq!(bytes_to_megabytes(1_000_000.0), 1.0);
        assert_eq!(bytes_to_megabytes(2_500_000.0), 2.5);
        assert_eq!(bytes_to_megabytes(1_234_567.0), 1.23);
        assert_eq!(bytes_to_megabytes(0.0), 0.0);
    }

    #[test]
    fn time_format_validation() {
        assert!(is_valid_time_format(DEFAULT_TIME_FORMAT));
        assert!(is_valid_time_format("%H:%M:%S"));
        assert!(!is_valid_time_format(""));
        assert!(!is_valid_time_format("%Q"));
    }

    #[test]
    fn invalid_time_format_falls_back_to_default() {
        let ingestor = SnapshotIngestor::new("%Q");
        assert_eq!(ingestor.time_format(), DEFAULT_TIME_FORMAT);
        assert_eq!(SnapshotIngestor::new("").time_format(), DEFAULT_TIME_FORMAT);
        assert_eq!(SnapshotIngestor::new("%H:%M").time_format(), "%H:%M");
    }
}
