use sleepwatch::kernel::consolidator::Consolidator;
use sleepwatch::kernel::phase::Phase;
use sleepwatch::kernel::telemetry::recorder::TelemetryRecorder;
use sleepwatch::kernel::time::Timestamp;
use sleepwatch::kernel::tracker::PhaseTracker;

fn at(secs: u64) -> Timestamp {
    Timestamp::from_secs(secs)
}

#[test]
fn test_tick_without_samples_appends_nothing() {
    let mut consolidator = Consolidator::new(20);
    let mut tracker = PhaseTracker::new();
    let mut telemetry = TelemetryRecorder::new();

    assert_eq!(consolidator.tick(at(60), &mut tracker, &mut telemetry), 0);
    assert_eq!(consolidator.tick(at(120), &mut tracker, &mut telemetry), 0);
    assert!(consolidator.buffer().is_empty());
    assert_eq!(telemetry.snapshot().buffer_stats.consolidations, 0);
}

#[test]
fn test_repeated_tick_is_idempotent() {
    let mut consolidator = Consolidator::new(20);
    let mut tracker = PhaseTracker::new();
    let mut telemetry = TelemetryRecorder::new();

    tracker.observe(Phase::DeepSleep, at(0));
    assert_eq!(consolidator.tick(at(60), &mut tracker, &mut telemetry), 1);
    assert_eq!(consolidator.tick(at(60), &mut tracker, &mut telemetry), 0);
    assert_eq!(consolidator.buffer().len(), 1);
}

#[test]
fn test_tick_force_closes_current_interval() {
    let mut consolidator = Consolidator::new(20);
    let mut tracker = PhaseTracker::new();
    let mut telemetry = TelemetryRecorder::new();

    tracker.observe(Phase::DeepSleep, at(0));
    consolidator.tick(at(30), &mut tracker, &mut telemetry);

    let entries = consolidator.buffer().to_vec();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].phase, Phase::DeepSleep);
    assert_eq!(entries[0].duration_seconds, 30.0);
    assert_eq!(entries[0].time, at(30));

    // Phase survives the tick; the interval restarts at the tick
    assert_eq!(tracker.current_phase(), Some(Phase::DeepSleep));
    assert_eq!(tracker.phase_start(), Some(at(30)));
    assert!(tracker.accumulated().is_zero());
}

#[test]
fn test_one_entry_per_nonzero_phase() {
    let mut consolidator = Consolidator::new(20);
    let mut tracker = PhaseTracker::new();
    let mut telemetry = TelemetryRecorder::new();

    tracker.observe(Phase::Awake, at(0));
    tracker.observe(Phase::DeepSleep, at(10));
    tracker.observe(Phase::DeepSleep, at(40));
    consolidator.tick(at(40), &mut tracker, &mut telemetry);

    let entries = consolidator.buffer().to_vec();
    let phases: Vec<Phase> = entries.iter().map(|e| e.phase).collect();
    assert_eq!(phases, vec![Phase::DeepSleep, Phase::Awake], "LightSleep had no time");
    assert_eq!(entries[0].duration_seconds, 30.0);
    assert_eq!(entries[1].duration_seconds, 10.0);
}

#[test]
fn test_no_duration_lost_across_ticks() {
    let mut consolidator = Consolidator::new(100);
    let mut tracker = PhaseTracker::new();
    let mut telemetry = TelemetryRecorder::new();

    tracker.observe(Phase::LightSleep, at(0));
    for minute in 1..=5 {
        tracker.observe(Phase::LightSleep, at(minute * 60 - 30));
        consolidator.tick(at(minute * 60), &mut tracker, &mut telemetry);
    }

    let total: f64 = consolidator.buffer().iter().map(|e| e.duration_seconds).sum();
    assert_eq!(total, 300.0);
}

#[test]
fn test_sleep_buffer_evicts_oldest() {
    let mut consolidator = Consolidator::new(20);
    let mut tracker = PhaseTracker::new();
    let mut telemetry = TelemetryRecorder::new();

    tracker.observe(Phase::DeepSleep, at(0));
    for i in 1..=25 {
        consolidator.tick(at(i * 60), &mut tracker, &mut telemetry);
    }

    let entries = consolidator.buffer().to_vec();
    assert_eq!(entries.len(), 20);
    assert_eq!(entries[0].time, at(6 * 60));
    assert_eq!(telemetry.snapshot().buffer_stats.sleep_evictions, 5);
}
