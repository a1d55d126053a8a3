use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::outputs::report::{ReportAggregator, ReportData};
use crate::storage::gateway::{load_last_adverse_event, FlushSummary, PersistenceGateway};
use crate::storage::store::KeyValueStore;
use crate::storage::types::{AdverseEvent, ADVERSE_EVENTS_KEY, LAST_ADVERSE_EVENT_KEY, SLEEP_LOG_KEY};

use super::classifier::Classifier;
use super::consolidator::Consolidator;
use super::debouncer::EventDebouncer;
use super::effect::SideEffect;
use super::event::{AccelSample, Event, Sample};
use super::phase::Phase;
use super::time::Timestamp;
use super::tracker::PhaseTracker;
use super::telemetry::event::{LifecycleEvent, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;

/// Result of feeding one sample through the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub phase: Phase,
    pub adverse_event: Option<AdverseEvent>,
}

/// Owns all aggregation state for one process lifetime.
///
/// Every handler is synchronous and runs on the single event timeline; nothing
/// here is shared across threads, so no locking.
pub struct Engine<S: KeyValueStore> {
    config: EngineConfig,
    classifier: Classifier,
    tracker: PhaseTracker,
    debouncer: EventDebouncer,
    consolidator: Consolidator,
    gateway: PersistenceGateway,
    store: S,
    last_heart_rate: Option<u16>,
    pub telemetry: TelemetryRecorder,
}

impl<S: KeyValueStore> Engine<S> {
    pub fn new(config: EngineConfig, store: S) -> Self {
        let mut debouncer = EventDebouncer::new(
            config.adverse_threshold,
            config.debounce_window(),
            config.adverse_buffer_cap,
        );
        if let Some(at) = load_last_adverse_event(&store) {
            debouncer.restore_last_event_time(at);
        }

        Self {
            classifier: Classifier::new(config.classifier.clone()),
            tracker: PhaseTracker::new(),
            debouncer,
            consolidator: Consolidator::new(config.sleep_buffer_cap),
            gateway: PersistenceGateway::new(config.retention()),
            store,
            last_heart_rate: None,
            telemetry: TelemetryRecorder::new(),
            config,
        }
    }

    /// Dispatch one event. Returns effects for the driver to execute.
    pub fn handle(&mut self, event: Event) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        match event {
            Event::Accel { at, accel } => {
                self.on_sample(at, accel);
            }
            Event::HeartRate { bpm } => self.on_heart_rate(bpm),
            Event::FlushTick { at } => {
                let summary = self.on_tick(at);
                if !summary.is_clean() {
                    effects.push(SideEffect::Log(format!("Flush had {} failure(s); data kept for retry", summary.failures)));
                }
            }
            Event::ReportRequested { at } => {
                if let Some(report) = self.on_report(at) {
                    effects.push(SideEffect::Render(report));
                }
            }
            Event::ResetRequested { at } => {
                self.on_reset(at);
                effects.push(SideEffect::Log("Data has been reset.".to_string()));
            }
            Event::Shutdown { at } => {
                self.on_shutdown(at);
            }
        }
        effects
    }

    /// Accelerometer poll: magnitude from the vector, heart rate from the cache.
    pub fn on_sample(&mut self, at: Timestamp, accel: AccelSample) -> SampleOutcome {
        let sample = Sample::new(at, accel.magnitude(), self.last_heart_rate);
        self.observe(&sample)
    }

    /// Classify, track, and debounce an already-reduced sample.
    pub fn observe(&mut self, sample: &Sample) -> SampleOutcome {
        let phase = self.classifier.classify(sample);
        self.tracker.observe(phase, sample.timestamp);
        let adverse_event = self.debouncer.consider(sample.magnitude, sample.timestamp, &mut self.telemetry);
        SampleOutcome { phase, adverse_event }
    }

    pub fn on_heart_rate(&mut self, bpm: u16) {
        self.last_heart_rate = Some(bpm);
    }

    /// Periodic consolidation immediately followed by a flush.
    pub fn on_tick(&mut self, now: Timestamp) -> FlushSummary {
        self.consolidator.tick(now, &mut self.tracker, &mut self.telemetry);
        let last_event = self.debouncer.last_event_time();
        let (sleep_buffer, adverse_buffer) = (self.consolidator.buffer_mut(), self.debouncer.buffer_mut());
        self.gateway.flush(now, sleep_buffer, adverse_buffer, last_event, &mut self.store, &mut self.telemetry)
    }

    /// Final consolidation + flush before the process exits.
    pub fn on_shutdown(&mut self, now: Timestamp) -> FlushSummary {
        let summary = self.on_tick(now);
        self.telemetry.record(TelemetryEvent::Lifecycle(LifecycleEvent::Shutdown));
        if summary.is_clean() {
            info!("Shutdown flush complete");
        } else {
            warn!("Shutdown flush had {} failure(s); buffered data may be lost", summary.failures);
        }
        summary
    }

    /// Read-only report over the durable logs. Storage errors are logged, not surfaced.
    pub fn on_report(&mut self, now: Timestamp) -> Option<ReportData> {
        match ReportAggregator::generate(now, &self.store, &mut self.telemetry) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Failed to generate report: {}", e);
                None
            }
        }
    }

    /// Erase persisted logs and re-zero every in-memory accumulator and buffer.
    pub fn on_reset(&mut self, now: Timestamp) {
        for key in [SLEEP_LOG_KEY, ADVERSE_EVENTS_KEY, LAST_ADVERSE_EVENT_KEY] {
            if let Err(e) = self.store.erase(key) {
                warn!("Failed to erase '{}': {}", key, e);
            }
        }
        self.tracker.reset(now);
        self.consolidator.buffer_mut().clear();
        self.debouncer.buffer_mut().clear();
        self.telemetry.record(TelemetryEvent::Lifecycle(LifecycleEvent::Reset));
        info!("Sleep data reset");
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tracker(&self) -> &PhaseTracker {
        &self.tracker
    }

    pub fn debouncer(&self) -> &EventDebouncer {
        &self.debouncer
    }

    pub fn consolidator(&self) -> &Consolidator {
        &self.consolidator
    }

    pub fn last_heart_rate(&self) -> Option<u16> {
        self.last_heart_rate
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
