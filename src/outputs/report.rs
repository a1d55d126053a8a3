use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::kernel::phase::Phase;
use crate::kernel::telemetry::event::{LifecycleEvent, LogKind, TelemetryEvent};
use crate::kernel::telemetry::recorder::TelemetryRecorder;
use crate::kernel::time::Timestamp;
use crate::storage::gateway::load_log;
use crate::storage::store::KeyValueStore;
use crate::storage::types::{AdverseEvent, SleepLogEntry, ADVERSE_EVENTS_KEY, SLEEP_LOG_KEY};

/// What the renderer shows. Totals reflect the durable logs only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub generated_at: Timestamp,
    pub deep_sleep_seconds: f64,
    pub light_sleep_seconds: f64,
    pub awake_seconds: f64,
    pub adverse_event_count: usize,
}

impl ReportData {
    pub fn seconds(&self, phase: Phase) -> f64 {
        match phase {
            Phase::DeepSleep => self.deep_sleep_seconds,
            Phase::LightSleep => self.light_sleep_seconds,
            Phase::Awake => self.awake_seconds,
        }
    }
}

/// Display collaborator. Lives outside the engine; the engine only hands it data.
pub trait Renderer {
    fn render(&mut self, report: &ReportData);
}

/// Folds the durable logs into phase totals. Never writes.
pub struct ReportAggregator;

impl ReportAggregator {
    pub fn generate<S: KeyValueStore + ?Sized>(
        now: Timestamp,
        store: &S,
        telemetry: &mut TelemetryRecorder,
    ) -> StoreResult<ReportData> {
        let sleep_log: Vec<SleepLogEntry> = load_log(store, SLEEP_LOG_KEY, LogKind::SleepLog, telemetry)?;
        let adverse_log: Vec<AdverseEvent> = load_log(store, ADVERSE_EVENTS_KEY, LogKind::AdverseEvents, telemetry)?;

        let mut report = ReportData {
            generated_at: now,
            adverse_event_count: adverse_log.len(),
            ..ReportData::default()
        };
        for entry in &sleep_log {
            let slot = match entry.phase {
                Phase::DeepSleep => &mut report.deep_sleep_seconds,
                Phase::LightSleep => &mut report.light_sleep_seconds,
                Phase::Awake => &mut report.awake_seconds,
            };
            *slot += entry.duration_seconds.max(0.0);
        }

        telemetry.record(TelemetryEvent::Lifecycle(LifecycleEvent::ReportGenerated));
        Ok(report)
    }
}
