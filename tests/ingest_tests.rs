// Snapshot ingestion tests: discard path, unit conversion, all-or-nothing updates

mod common;

use common::sample_snapshot;
use resmon::buffer::WINDOW_CAPACITY;
use resmon::ingest::{IngestError, IngestOutcome, MonitorState, SnapshotIngestor};
use resmon::models::{RawProcess, RawSnapshot};

fn populated_state(ingestor: &SnapshotIngestor) -> MonitorState {
    let mut state = MonitorState::default();
    for i in 0..3 {
        ingestor
            .ingest_at(&mut state, sample_snapshot(i as f64), &format!("9:00:0{i} AM"))
            .unwrap();
    }
    state
}

#[test]
fn test_accepted_snapshot_updates_every_field() {
    let ingestor = SnapshotIngestor::default();
    let mut state = MonitorState::default();
    let outcome = ingestor
        .ingest_at(&mut state, sample_snapshot(17.5), "10:15:00 AM")
        .unwrap();
    assert_eq!(outcome, IngestOutcome::Applied);
    assert!(outcome.applied());

    let sample = state.usage_history.latest().unwrap();
    assert_eq!(sample.timestamp, "10:15:00 AM");
    assert_eq!(sample.cpu_usage, 17.5);
    assert_eq!(sample.memory_usage, 40.0);

    let speed = state.speed_history.latest().unwrap();
    assert_eq!(speed.timestamp, "10:15:00 AM");
    assert_eq!(speed.upload_mbps, 2.50);
    assert_eq!(speed.download_mbps, 0.13);

    assert_eq!(state.network_totals.sent_mb, 1.00);
    assert_eq!(state.network_totals.received_mb, 3.46);
    assert_eq!(state.system_info.boot_time, "2024-05-01 08:00:00");
    assert_eq!(state.system_info.uptime, "26:05:09.5");
    assert_eq!(state.disk_usage_percent, 71.3);
    assert_eq!(state.top_processes.len(), 2);
}

#[test]
fn test_stopped_message_leaves_state_identical() {
    let ingestor = SnapshotIngestor::default();
    let mut state = populated_state(&ingestor);
    let before = state.clone();

    let outcome = ingestor
        .ingest_at(&mut state, RawSnapshot::stopped(), "9:00:09 AM")
        .unwrap();
    assert_eq!(outcome, IngestOutcome::Discarded);
    assert!(!outcome.applied());
    assert_eq!(state, before);
}

#[test]
fn test_stopped_message_wins_over_metrics() {
    let ingestor = SnapshotIngestor::default();
    let mut state = MonitorState::default();
    let mut raw = sample_snapshot(50.0);
    raw.message = Some("Monitoring is stopped".into());
    let outcome = ingestor.ingest_at(&mut state, raw, "now").unwrap();
    assert_eq!(outcome, IngestOutcome::Discarded);
    assert!(state.usage_history.is_empty());
}

#[test]
fn test_other_message_does_not_discard() {
    let ingestor = SnapshotIngestor::default();
    let mut state = MonitorState::default();
    let mut raw = sample_snapshot(50.0);
    raw.message = Some("Monitoring started".into());
    let outcome = ingestor.ingest_at(&mut state, raw, "now").unwrap();
    assert_eq!(outcome, IngestOutcome::Applied);
}

#[test]
fn test_missing_field_is_rejected_without_mutation() {
    let ingestor = SnapshotIngestor::default();
    let mut state = populated_state(&ingestor);
    let before = state.clone();

    let mut raw = sample_snapshot(99.0);
    raw.download_speed = None;
    let err = ingestor.ingest_at(&mut state, raw, "now").unwrap_err();
    assert_eq!(err, IngestError::MissingField("download_speed"));
    assert_eq!(state, before);

    let err = ingestor
        .ingest_at(&mut state, RawSnapshot::default(), "now")
        .unwrap_err();
    assert!(matches!(err, IngestError::MissingField(_)));
    assert_eq!(state, before);
}

#[test]
fn test_process_missing_field_is_rejected() {
    let ingestor = SnapshotIngestor::default();
    let mut state = MonitorState::default();
    let mut raw = sample_snapshot(1.0);
    raw.top_processes.as_mut().unwrap().push(RawProcess {
        name: Some("ghost".into()),
        pid: Some(4),
        cpu_percent: None,
        memory_percent: Some(0.1),
    });
    let err = ingestor.ingest_at(&mut state, raw, "now").unwrap_err();
    assert_eq!(
        err,
        IngestError::MissingProcessField {
            index: 2,
            field: "cpu_percent"
        }
    );
    assert!(state.usage_history.is_empty());
    assert!(state.top_processes.is_empty());
}

#[test]
fn test_duplicate_pid_is_rejected() {
    let ingestor = SnapshotIngestor::default();
    let mut state = MonitorState::default();
    let mut raw = sample_snapshot(1.0);
    let first = raw.top_processes.as_ref().unwrap()[0].clone();
    raw.top_processes.as_mut().unwrap().push(first);
    let err = ingestor.ingest_at(&mut state, raw, "now").unwrap_err();
    assert_eq!(err, IngestError::DuplicatePid(812));
    assert!(state.top_processes.is_empty());
}

#[test]
fn test_process_list_is_replaced_in_collector_order() {
    let ingestor = SnapshotIngestor::default();
    let mut state = populated_state(&ingestor);

    let mut raw = sample_snapshot(5.0);
    raw.top_processes = Some(vec![
        RawProcess {
            name: Some("idle".into()),
            pid: Some(1),
            cpu_percent: Some(0.0),
            memory_percent: Some(0.0),
        },
        RawProcess {
            name: Some("rustc".into()),
            pid: Some(9001),
            cpu_percent: Some(88.0),
            memory_percent: Some(12.0),
        },
    ]);
    ingestor.ingest_at(&mut state, raw, "now").unwrap();
    let names: Vec<&str> = state.top_processes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["idle", "rustc"]);

    let mut raw = sample_snapshot(6.0);
    raw.top_processes = Some(vec![]);
    ingestor.ingest_at(&mut state, raw, "later").unwrap();
    assert!(state.top_processes.is_empty());
}

#[test]
fn test_histories_slide_after_window_fills() {
    let ingestor = SnapshotIngestor::default();
    let mut state = MonitorState::default();
    for i in 0..30 {
        ingestor
            .ingest_at(&mut state, sample_snapshot(i as f64), &format!("t{i}"))
            .unwrap();
        assert!(state.usage_history.len() <= WINDOW_CAPACITY);
        assert!(state.speed_history.len() <= WINDOW_CAPACITY);
    }
    let cpu: Vec<f64> = state.usage_history.iter().map(|s| s.cpu_usage).collect();
    assert_eq!(cpu, (9..30).map(|i| i as f64).collect::<Vec<_>>());
    let first = state.speed_history.iter().next().unwrap();
    assert_eq!(first.timestamp, "t9");
}

#[test]
fn test_ingest_stamps_with_configured_format() {
    let ingestor = SnapshotIngestor::new("%H:%M:%S");
    let mut state = MonitorState::default();
    ingestor.ingest(&mut state, sample_snapshot(1.0)).unwrap();
    let ts = &state.usage_history.latest().unwrap().timestamp;
    assert_eq!(ts.len(), 8, "unexpected timestamp {ts:?}");
    assert_eq!(ts.matches(':').count(), 2);
}

#[test]
fn test_ingest_with_invalid_format_stamps_with_default() {
    let ingestor = SnapshotIngestor::new("%Q at %H");
    let mut state = MonitorState::default();
    let outcome = ingestor.ingest(&mut state, sample_snapshot(1.0)).unwrap();
    assert_eq!(outcome, IngestOutcome::Applied);
    let ts = &state.usage_history.latest().unwrap().timestamp;
    assert!(
        ts.ends_with(" AM") || ts.ends_with(" PM"),
        "unexpected timestamp {ts:?}"
    );
}
