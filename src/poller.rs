// Polling lifecycle: the running/stopped state machine and the tick timer that drives
// fetch-and-ingest cycles against the collector.
// Each fetch runs on its own task; stopping cancels future ticks, never an in-flight fetch.
// Coalescing only looks at fetches started by the current timer, and a fetch that never
// resolves holds back at most MAX_COALESCED_TICKS ticks in a row.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

use crate::collector::{Collector, CollectorError};
use crate::ingest::{IngestError, IngestOutcome};
use crate::live::LiveState;
use crate::models::MonitoringState;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Consecutive ticks a pending fetch may suppress before the next one fires anyway.
pub const MAX_COALESCED_TICKS: u32 = 1;

/// Why a cycle left the state untouched.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Fetch(#[from] CollectorError),
    #[error("snapshot rejected: {0}")]
    Rejected(#[from] IngestError),
}

/// What to do with a failed cycle. Polling continues regardless.
pub trait PollErrorPolicy: Send + Sync {
    fn on_error(&self, error: &PollError);
}

/// Default policy: log a warning and wait for the next tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAndContinue;

impl PollErrorPolicy for LogAndContinue {
    fn on_error(&self, error: &PollError) {
        match error {
            PollError::Fetch(e) => {
                tracing::warn!(error = %e, operation = "fetch_metrics", "Error fetching metrics");
            }
            PollError::Rejected(e) => {
                tracing::warn!(error = %e, operation = "ingest_snapshot", "Malformed snapshot skipped");
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Skip a tick while the previous fetch is still in flight.
    pub coalesce_in_flight: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            coalesce_in_flight: true,
        }
    }
}

/// Lifetime counters for the polling loop.
#[derive(Debug, Default)]
pub struct PollStats {
    ticks_fired: AtomicU64,
    ticks_skipped: AtomicU64,
    snapshots_applied: AtomicU64,
    snapshots_discarded: AtomicU64,
    snapshots_rejected: AtomicU64,
    fetch_failures: AtomicU64,
    timers_armed: AtomicU64,
    timers_cancelled: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollStatsSnapshot {
    pub ticks_fired: u64,
    pub ticks_skipped: u64,
    pub snapshots_applied: u64,
    pub snapshots_discarded: u64,
    pub snapshots_rejected: u64,
    pub fetch_failures: u64,
    pub timers_armed: u64,
    pub timers_cancelled: u64,
}

impl PollStats {
    pub fn snapshot(&self) -> PollStatsSnapshot {
        PollStatsSnapshot {
            ticks_fired: self.ticks_fired.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            snapshots_applied: self.snapshots_applied.load(Ordering::Relaxed),
            snapshots_discarded: self.snapshots_discarded.load(Ordering::Relaxed),
            snapshots_rejected: self.snapshots_rejected.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            timers_armed: self.timers_armed.load(Ordering::Relaxed),
            timers_cancelled: self.timers_cancelled.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Recurring tick task; dropping it cancels the timer.
struct TickTimer(JoinHandle<()>);

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Decrements the in-flight fetch count on drop (spawn = +1, completion = -1).
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Everything one fetch-and-ingest cycle needs; cloned into the timer task.
#[derive(Clone)]
struct Cycle {
    collector: Arc<dyn Collector>,
    live: Arc<LiveState>,
    policy: Arc<dyn PollErrorPolicy>,
    stats: Arc<PollStats>,
    in_flight: Arc<AtomicUsize>,
    coalesce: bool,
}

impl Cycle {
    /// `skipped` counts consecutive coalesced ticks of the calling timer.
    fn tick(&self, skipped: &mut u32) {
        let pending = self.in_flight.load(Ordering::Acquire);
        if self.coalesce && pending > 0 {
            if *skipped < MAX_COALESCED_TICKS {
                *skipped += 1;
                PollStats::bump(&self.stats.ticks_skipped);
                tracing::debug!(operation = "tick", "Previous fetch still in flight; tick skipped");
                return;
            }
            tracing::debug!(
                operation = "tick",
                pending,
                skipped = *skipped,
                "Fetch still unresolved after skipped ticks; fetching anyway"
            );
        }
        *skipped = 0;
        PollStats::bump(&self.stats.ticks_fired);
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard(self.in_flight.clone());
        let cycle = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            cycle.fetch_and_ingest().await;
        });
    }

    async fn fetch_and_ingest(&self) {
        let result = match self.collector.fetch_metrics().await {
            Ok(raw) => self.live.apply(raw).map_err(PollError::from),
            Err(e) => Err(PollError::from(e)),
        };
        match result {
            Ok(IngestOutcome::Applied) => {
                PollStats::bump(&self.stats.snapshots_applied);
            }
            Ok(IngestOutcome::Discarded) => {
                PollStats::bump(&self.stats.snapshots_discarded);
                tracing::debug!(
                    operation = "ingest_snapshot",
                    "Collector reports monitoring is stopped; snapshot discarded"
                );
            }
            Err(e) => {
                match &e {
                    PollError::Fetch(_) => PollStats::bump(&self.stats.fetch_failures),
                    PollError::Rejected(_) => PollStats::bump(&self.stats.snapshots_rejected),
                }
                self.policy.on_error(&e);
            }
        }
    }
}

/// Owns the monitoring state machine and at most one tick timer.
///
/// Entering `Running` runs one cycle immediately, then one per interval until the
/// controller leaves `Running`.
pub struct PollingController {
    cycle: Cycle,
    interval: Duration,
    timer: Option<TickTimer>,
}

impl PollingController {
    pub fn new(collector: Arc<dyn Collector>, live: Arc<LiveState>, config: PollerConfig) -> Self {
        Self {
            cycle: Cycle {
                collector,
                live,
                policy: Arc::new(LogAndContinue),
                stats: Arc::new(PollStats::default()),
                in_flight: Arc::new(AtomicUsize::new(0)),
                coalesce: config.coalesce_in_flight,
            },
            interval: config.interval,
            timer: None,
        }
    }

    pub fn with_error_policy(mut self, policy: Arc<dyn PollErrorPolicy>) -> Self {
        self.cycle.policy = policy;
        self
    }

    /// Application start: enter `Running` and arm the timer without sending a
    /// remote start command. Must be called inside a tokio runtime.
    pub fn begin_polling(&mut self) {
        self.cycle.live.set_monitoring(MonitoringState::Running);
        self.arm();
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Polling started");
    }

    /// Flips between `Running` and `Stopped`, sending the matching remote command
    /// first. When the command fails the state and timer are left untouched.
    pub async fn toggle(&mut self) -> Result<MonitoringState, CollectorError> {
        match self.state() {
            MonitoringState::Running => {
                self.cycle.collector.stop().await?;
                self.cycle.live.set_monitoring(MonitoringState::Stopped);
                self.disarm();
            }
            MonitoringState::Stopped => {
                self.cycle.collector.start().await?;
                self.cycle.live.set_monitoring(MonitoringState::Running);
                self.arm();
            }
        }
        let state = self.state();
        tracing::info!(state = %state, "Monitoring toggled");
        Ok(state)
    }

    /// Cancels the timer without contacting the collector.
    pub fn shutdown(&mut self) {
        self.disarm();
        tracing::debug!("Poller shutting down");
    }

    pub fn state(&self) -> MonitoringState {
        self.cycle.live.monitoring()
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Fetches started by the current timer and not yet completed.
    pub fn in_flight(&self) -> usize {
        self.cycle.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> Arc<PollStats> {
        self.cycle.stats.clone()
    }

    fn arm(&mut self) {
        self.disarm();
        // Fetches left over from an earlier Running period keep their own counter.
        self.cycle.in_flight = Arc::new(AtomicUsize::new(0));
        let cycle = self.cycle.clone();
        let period = self.interval;
        let span = tracing::debug_span!("poller", interval_ms = period.as_millis() as u64);
        let handle = tokio::spawn(
            async move {
                let mut tick = interval(period);
                tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
                let mut skipped = 0;
                loop {
                    tick.tick().await;
                    cycle.tick(&mut skipped);
                }
            }
            .instrument(span),
        );
        PollStats::bump(&self.cycle.stats.timers_armed);
        self.timer = Some(TickTimer(handle));
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            drop(timer);
            PollStats::bump(&self.cycle.stats.timers_cancelled);
        }
    }
}

/// Spawns the periodic INFO "app stats" line.
pub fn spawn_stats_logger(
    stats: Arc<PollStats>,
    live: Arc<LiveState>,
    ws_connections: Arc<AtomicUsize>,
    log_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(log_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        tick.tick().await;
        loop {
            tick.tick().await;
            let s = stats.snapshot();
            tracing::info!(
                monitoring = %live.monitoring(),
                ws_dashboard_clients = ws_connections.load(Ordering::Relaxed),
                ticks_fired = s.ticks_fired,
                ticks_skipped = s.ticks_skipped,
                snapshots_applied = s.snapshots_applied,
                snapshots_discarded = s.snapshots_discarded,
                snapshots_rejected = s.snapshots_rejected,
                fetch_failures = s.fetch_failures,
                "app stats"
            );
        }
    })
}
