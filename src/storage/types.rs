use serde::{Deserialize, Serialize};
use crate::kernel::phase::Phase;
use crate::kernel::time::Timestamp;

/// Store key for the discrete sleep log.
pub const SLEEP_LOG_KEY: &str = "sleepLog";
/// Store key for the adverse event log.
pub const ADVERSE_EVENTS_KEY: &str = "adverseEvents";
/// Store key for the debouncer's last emission time.
pub const LAST_ADVERSE_EVENT_KEY: &str = "lastAdverseEvent";

/// One consolidated slice of time spent in a phase.
/// Discrete rows (rather than one cumulative row) so retention can purge by age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLogEntry {
    pub time: Timestamp,
    pub phase: Phase,
    pub duration_seconds: f64,
}

impl SleepLogEntry {
    pub fn new(time: Timestamp, phase: Phase, duration_ms: u64) -> Self {
        Self {
            time,
            phase,
            duration_seconds: duration_ms as f64 / 1000.0,
        }
    }
}

/// A debounced high-magnitude spike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdverseEvent {
    pub time: Timestamp,
    pub magnitude: f64,
}
