use std::time::Duration;
use sleepwatch::kernel::debouncer::EventDebouncer;
use sleepwatch::kernel::event::{AccelSample, Sample};
use sleepwatch::kernel::telemetry::recorder::TelemetryRecorder;
use sleepwatch::kernel::time::Timestamp;
use sleepwatch::storage::{InMemoryStore, KeyValueStore, ADVERSE_EVENTS_KEY};
use sleepwatch::{Engine, EngineConfig};

const POLL_MS: u64 = 800;

fn debouncer() -> EventDebouncer {
    EventDebouncer::new(0.5, Duration::from_millis(2 * POLL_MS), 20)
}

#[test]
fn test_below_or_at_threshold_is_noop() {
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();

    assert!(d.consider(0.3, Timestamp::from_millis(0), &mut telemetry).is_none());
    assert!(d.consider(0.5, Timestamp::from_millis(10_000), &mut telemetry).is_none());
    assert!(d.buffer().is_empty());
    assert_eq!(d.last_event_time(), None);
    assert!(telemetry.is_empty(), "Quiet samples leave no trace");
}

#[test]
fn test_first_spike_always_emits() {
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();

    let event = d.consider(2.0, Timestamp::from_millis(0), &mut telemetry).expect("should emit");
    assert_eq!(event.magnitude, 2.0);
    assert_eq!(event.time, Timestamp::from_millis(0));
    assert_eq!(d.buffer().len(), 1);
}

#[test]
fn test_sustained_spikes_are_rate_limited() {
    // Samples every 400ms, all above threshold, for 5 seconds
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();
    let window = 2 * POLL_MS;
    let duration = 5_000;

    let mut emitted = Vec::new();
    let mut t = 0;
    while t <= duration {
        if let Some(event) = d.consider(1.8, Timestamp::from_millis(t), &mut telemetry) {
            emitted.push(event.time.millis);
        }
        t += 400;
    }

    assert_eq!(emitted, vec![0, 1_600, 3_200, 4_800]);
    assert!(emitted.len() as u64 <= duration / window + 1);
    for pair in emitted.windows(2) {
        assert!(pair[1] - pair[0] >= window, "Never more than one event per window");
    }

    let snap = telemetry.snapshot();
    assert_eq!(snap.adverse_stats.emitted, 4);
    assert_eq!(snap.adverse_stats.suppressed, 13 - 4);
}

#[test]
fn test_window_boundary_is_inclusive() {
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();

    assert!(d.consider(1.0, Timestamp::from_millis(0), &mut telemetry).is_some());
    assert!(d.consider(1.0, Timestamp::from_millis(1_599), &mut telemetry).is_none());
    assert!(d.consider(1.0, Timestamp::from_millis(1_600), &mut telemetry).is_some());
}

#[test]
fn test_suppressed_spike_does_not_extend_window() {
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();

    d.consider(1.0, Timestamp::from_millis(0), &mut telemetry);
    d.consider(1.0, Timestamp::from_millis(1_000), &mut telemetry);
    assert!(d.consider(1.0, Timestamp::from_millis(1_600), &mut telemetry).is_some());
}

#[test]
fn test_buffer_keeps_most_recent_twenty() {
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();

    for i in 0..25u64 {
        let at = Timestamp::from_millis(i * 2_000);
        assert!(d.consider(1.0 + i as f64, at, &mut telemetry).is_some());
    }

    let buffered = d.buffer().to_vec();
    assert_eq!(buffered.len(), 20);
    assert_eq!(buffered.first().map(|e| e.time.millis), Some(5 * 2_000));
    assert_eq!(buffered.last().map(|e| e.time.millis), Some(24 * 2_000));
    assert_eq!(telemetry.snapshot().buffer_stats.adverse_evictions, 5);
}

#[test]
fn test_restored_clock_suppresses_and_never_rewinds() {
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();

    d.restore_last_event_time(Timestamp::from_millis(10_000));
    assert!(d.consider(1.0, Timestamp::from_millis(10_800), &mut telemetry).is_none());

    d.restore_last_event_time(Timestamp::from_millis(0));
    assert_eq!(d.last_event_time(), Some(Timestamp::from_millis(10_000)));

    assert!(d.consider(1.0, Timestamp::from_millis(11_600), &mut telemetry).is_some());
}

#[test]
fn test_non_finite_magnitudes_are_clamped() {
    let mut d = debouncer();
    let mut telemetry = TelemetryRecorder::new();

    assert!(d.consider(f64::NAN, Timestamp::from_millis(0), &mut telemetry).is_none());
    let event = d.consider(f64::INFINITY, Timestamp::from_millis(0), &mut telemetry).expect("should emit");
    assert_eq!(event.magnitude, f64::MAX);

    assert_eq!(Sample::new(Timestamp::from_millis(0), f64::NAN, None).magnitude, 0.0);
    assert!(AccelSample::new(1e200, 0.0, 0.0).magnitude().is_finite());
}

#[test]
fn test_huge_reading_does_not_corrupt_persisted_history() {
    let mut engine = Engine::new(EngineConfig::default(), InMemoryStore::new());
    let spike = AccelSample::new(0.0, 0.0, 3.0);
    let at = |ms: u64| Timestamp::from_millis(1_700_000_000_000 + ms);

    assert!(engine.on_sample(at(0), spike).adverse_event.is_some());
    assert!(engine.on_sample(at(2_000), spike).adverse_event.is_some());
    engine.on_tick(at(3_000));

    let huge = engine.on_sample(at(5_000), AccelSample::new(1e200, 0.0, 0.0));
    assert!(huge.adverse_event.is_some());
    engine.on_tick(at(6_000));

    assert!(engine.on_sample(at(8_000), spike).adverse_event.is_some());
    engine.on_tick(at(9_000));

    let stored = engine.store().read(ADVERSE_EVENTS_KEY).unwrap().unwrap();
    let stored = stored.as_array().unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|e| e["magnitude"].is_f64()));

    let report = engine.on_report(at(10_000)).unwrap();
    assert_eq!(report.adverse_event_count, 4);
    assert_eq!(engine.telemetry.snapshot().flush_stats.malformed_discards, 0);
}
