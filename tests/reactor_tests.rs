use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sleepwatch::kernel::event::{AccelSample, Event};
use sleepwatch::kernel::phase::Phase;
use sleepwatch::kernel::time::Timestamp;
use sleepwatch::outputs::{ReportData, Renderer};
use sleepwatch::storage::{InMemoryStore, KeyValueStore, SleepLogEntry, SLEEP_LOG_KEY};
use sleepwatch::{Engine, EngineConfig, Reactor};

const T0: u64 = 1_700_000_000_000;

fn at(offset_ms: u64) -> Timestamp {
    Timestamp::from_millis(T0 + offset_ms)
}

#[derive(Clone, Default)]
struct CollectingRenderer {
    reports: Arc<Mutex<Vec<ReportData>>>,
}

impl Renderer for CollectingRenderer {
    fn render(&mut self, report: &ReportData) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

fn still() -> AccelSample {
    AccelSample::new(0.0, 0.0, 1.0)
}

#[tokio::test]
async fn test_events_processed_in_order_until_shutdown() {
    let (tx, rx) = mpsc::channel(100);
    let renderer = CollectingRenderer::default();
    let engine = Engine::new(EngineConfig::default(), InMemoryStore::new());
    let reactor = Reactor::new(rx, engine, renderer.clone());

    tx.send(Event::Accel { at: at(0), accel: still() }).await.unwrap();
    tx.send(Event::Accel { at: at(30_000), accel: still() }).await.unwrap();
    tx.send(Event::FlushTick { at: at(30_000) }).await.unwrap();
    tx.send(Event::ReportRequested { at: at(30_000) }).await.unwrap();
    tx.send(Event::Accel { at: at(45_000), accel: AccelSample::new(0.0, 0.0, 1.1) }).await.unwrap();
    tx.send(Event::Shutdown { at: at(60_000) }).await.unwrap();

    let mut engine = reactor.run(CancellationToken::new()).await;

    let reports = renderer.reports.lock().unwrap().clone();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].deep_sleep_seconds, 30.0);

    let final_report = engine.on_report(at(60_000)).unwrap();
    assert_eq!(final_report.deep_sleep_seconds, 45.0);
    assert_eq!(final_report.light_sleep_seconds, 15.0);
}

#[tokio::test]
async fn test_closed_channel_triggers_shutdown_flush() {
    let (tx, rx) = mpsc::channel(100);
    let engine = Engine::new(EngineConfig::default(), InMemoryStore::new());
    let reactor = Reactor::new(rx, engine, CollectingRenderer::default());

    // Shutdown stamps the wall clock, so anchor the sample a minute before it
    let start = Timestamp::now().before(Duration::from_secs(60));
    tx.send(Event::Accel { at: start, accel: still() }).await.unwrap();
    drop(tx);

    let mut engine = reactor.run(CancellationToken::new()).await;

    assert_eq!(engine.telemetry.snapshot().lifecycle_stats.shutdowns, 1);
    assert!(engine.consolidator().buffer().is_empty());

    let log: Vec<SleepLogEntry> = serde_json::from_value(engine.store().read(SLEEP_LOG_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].phase, Phase::DeepSleep);
    assert!(log[0].duration_seconds >= 60.0 && log[0].duration_seconds < 3_600.0);

    let report = engine.on_report(Timestamp::now()).unwrap();
    assert_eq!(report.deep_sleep_seconds, log[0].duration_seconds);
    assert_eq!(report.light_sleep_seconds, 0.0);
    assert_eq!(report.awake_seconds, 0.0);
}

#[tokio::test]
async fn test_cancellation_drains_queue_then_flushes() {
    let (tx, rx) = mpsc::channel(100);
    let engine = Engine::new(EngineConfig::default(), InMemoryStore::new());
    let reactor = Reactor::new(rx, engine, CollectingRenderer::default());

    let start = Timestamp::now();
    tx.send(Event::Accel { at: start, accel: AccelSample::new(0.0, 0.0, 3.0) }).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let engine = reactor.run(cancel).await;

    // Queued spike was still handled and reached the store
    let snap = engine.telemetry.snapshot();
    assert_eq!(snap.adverse_stats.emitted, 1);
    assert_eq!(snap.lifecycle_stats.shutdowns, 1);
    assert!(engine.debouncer().buffer().is_empty());
    drop(tx);
}

/// Takes a millisecond per report so a backlog outlives the flush period.
struct SlowRenderer(CollectingRenderer);

impl Renderer for SlowRenderer {
    fn render(&mut self, report: &ReportData) {
        std::thread::sleep(Duration::from_millis(1));
        self.0.render(report);
    }
}

#[tokio::test]
async fn test_backlog_does_not_starve_flush_timer() {
    let (tx, rx) = mpsc::channel(512);
    let config = EngineConfig { flush_interval_ms: 1, ..EngineConfig::default() };
    let engine = Engine::new(config, InMemoryStore::new());
    let collected = CollectingRenderer::default();
    let reactor = Reactor::new(rx, engine, SlowRenderer(collected.clone()));

    tx.send(Event::Accel { at: at(0), accel: still() }).await.unwrap();
    for i in 0..300 {
        tx.send(Event::ReportRequested { at: at(i) }).await.unwrap();
    }
    drop(tx);

    reactor.run(CancellationToken::new()).await;

    // Only a timer flush between reports can make sleep visible before shutdown
    let reports = collected.reports.lock().unwrap().clone();
    assert_eq!(reports.len(), 300);
    assert!(reports.iter().any(|r| r.deep_sleep_seconds > 0.0));
}
