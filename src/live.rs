// Live dashboard state: the single MonitorState plus the channel its views are published on.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;

use crate::ingest::{IngestError, IngestOutcome, MonitorState, SnapshotIngestor};
use crate::models::{DashboardView, MonitoringState, RawSnapshot};

/// Owns the dashboard state. Every accepted snapshot and every monitoring
/// state change publishes a fresh [`DashboardView`] to subscribers.
pub struct LiveState {
    state: Mutex<MonitorState>,
    ingestor: SnapshotIngestor,
    view_tx: watch::Sender<DashboardView>,
}

impl Default for LiveState {
    fn default() -> Self {
        Self::new(MonitorState::default(), SnapshotIngestor::default())
    }
}

impl LiveState {
    pub fn new(state: MonitorState, ingestor: SnapshotIngestor) -> Self {
        let (view_tx, _) = watch::channel(DashboardView::from_state(&state));
        Self {
            state: Mutex::new(state),
            ingestor,
            view_tx,
        }
    }

    /// Receives the current view immediately and every published view after it.
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view_tx.subscribe()
    }

    /// The most recently published view.
    pub fn view(&self) -> DashboardView {
        self.view_tx.borrow().clone()
    }

    pub fn monitoring(&self) -> MonitoringState {
        self.lock().monitoring
    }

    pub fn set_monitoring(&self, monitoring: MonitoringState) {
        let mut state = self.lock();
        if state.monitoring != monitoring {
            state.monitoring = monitoring;
            self.publish(&state);
        }
    }

    /// Ingests one collector snapshot; publishes only when it was applied.
    pub fn apply(&self, raw: RawSnapshot) -> Result<IngestOutcome, IngestError> {
        let mut state = self.lock();
        let outcome = self.ingestor.ingest(&mut state, raw)?;
        if outcome.applied() {
            self.publish(&state);
        }
        Ok(outcome)
    }

    /// Like [`LiveState::apply`] with a fixed display timestamp.
    pub fn apply_at(
        &self,
        raw: RawSnapshot,
        timestamp: &str,
    ) -> Result<IngestOutcome, IngestError> {
        let mut state = self.lock();
        let outcome = self.ingestor.ingest_at(&mut state, raw, timestamp)?;
        if outcome.applied() {
            self.publish(&state);
        }
        Ok(outcome)
    }

    /// Read access to the raw state (e.g. for inspection in tests).
    pub fn with_state<R>(&self, f: impl FnOnce(&MonitorState) -> R) -> R {
        f(&self.lock())
    }

    fn publish(&self, state: &MonitorState) {
        self.view_tx.send_replace(DashboardView::from_state(state));
    }

    // Ingestion validates before it mutates, so a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
