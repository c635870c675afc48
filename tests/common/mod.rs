// Shared test helpers: a scriptable in-memory collector and canned snapshots

#![allow(dead_code)]

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use resmon::collector::{Collector, CollectorError};
use resmon::models::{RawProcess, RawSnapshot};
use resmon::poller::{PollError, PollErrorPolicy};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::Duration;

/// A complete collector response; `cpu_percent` doubles as a sequence marker.
pub fn sample_snapshot(cpu_percent: f64) -> RawSnapshot {
    RawSnapshot {
        cpu_percent: Some(cpu_percent),
        memory_percent: Some(40.0),
        boot_time: Some("2024-05-01 08:00:00".into()),
        uptime: Some("26:05:09.5".into()),
        bytes_sent: Some(1_000_000),
        bytes_recv: Some(3_456_789),
        disk_usage_percent: Some(71.3),
        top_processes: Some(vec![
            RawProcess {
                name: Some("postgres".into()),
                pid: Some(812),
                cpu_percent: Some(12.5),
                memory_percent: Some(4.2),
            },
            RawProcess {
                name: Some("nginx".into()),
                pid: Some(77),
                cpu_percent: Some(3.0),
                memory_percent: Some(0.8),
            },
        ]),
        upload_speed: Some(2_500_000.0),
        download_speed: Some(125_000.0),
        message: None,
    }
}

/// In-memory collector. Like the real one, it answers with the "stopped"
/// document while paused, and decides its answer when the request is made.
pub struct FakeCollector {
    running: AtomicBool,
    fail_fetches: AtomicBool,
    fail_commands: AtomicBool,
    latency: Duration,
    command_latency: Duration,
    fetches: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl FakeCollector {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            fail_fetches: AtomicBool::new(false),
            fail_commands: AtomicBool::new(false),
            latency: Duration::ZERO,
            command_latency: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Delays the answer to start/stop commands.
    pub fn with_command_latency(mut self, latency: Duration) -> Self {
        self.command_latency = latency;
        self
    }

    /// Collector that is already paused.
    pub fn paused() -> Self {
        let c = Self::new();
        c.running.store(false, Ordering::SeqCst);
        c
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    fn command(&self, running: bool) -> Result<(), CollectorError> {
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(CollectorError::Unavailable("connection refused".into()));
        }
        self.running.store(running, Ordering::SeqCst);
        if running {
            self.starts.fetch_add(1, Ordering::SeqCst);
        } else {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Collector for FakeCollector {
    fn fetch_metrics(&self) -> BoxFuture<'_, Result<RawSnapshot, CollectorError>> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let response = if self.fail_fetches.load(Ordering::SeqCst) {
            Err(CollectorError::Unavailable("connection refused".into()))
        } else if !self.running.load(Ordering::SeqCst) {
            Ok(RawSnapshot::stopped())
        } else {
            Ok(sample_snapshot(n as f64))
        };
        let latency = self.latency;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            response
        }
        .boxed()
    }

    fn start(&self) -> BoxFuture<'_, Result<(), CollectorError>> {
        delayed(self.command_latency, self.command(true))
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), CollectorError>> {
        delayed(self.command_latency, self.command(false))
    }
}

fn delayed<T: Send + 'static>(latency: Duration, value: T) -> BoxFuture<'static, T> {
    async move {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        value
    }
    .boxed()
}

/// Error policy that remembers what it was handed.
#[derive(Default)]
pub struct RecordingPolicy {
    errors: Mutex<Vec<String>>,
}

impl RecordingPolicy {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl PollErrorPolicy for RecordingPolicy {
    fn on_error(&self, error: &PollError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
