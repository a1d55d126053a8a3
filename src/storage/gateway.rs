use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::kernel::buffer::CappedBuffer;
use crate::kernel::telemetry::event::{LogKind, TelemetryEvent};
use crate::kernel::telemetry::recorder::TelemetryRecorder;
use crate::kernel::time::Timestamp;
use super::store::KeyValueStore;
use super::types::{AdverseEvent, SleepLogEntry, ADVERSE_EVENTS_KEY, LAST_ADVERSE_EVENT_KEY, SLEEP_LOG_KEY};

/// Outcome of one flush. Failures are already logged; callers only inspect this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub sleep_written: usize,
    pub sleep_purged: usize,
    pub events_written: usize,
    pub failures: usize,
}

impl FlushSummary {
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// Read a JSON array log. Absent → empty. Malformed → empty, logged, counted.
/// I/O failures propagate so the caller can keep its buffers.
pub fn load_log<T, S>(store: &S, key: &str, log: LogKind, telemetry: &mut TelemetryRecorder) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let value = match store.read(key) {
        Ok(Some(value)) => value,
        Ok(None) => return Ok(Vec::new()),
        Err(e) if e.is_malformed() => {
            warn!("Discarding unreadable '{}': {}", key, e);
            telemetry.record(TelemetryEvent::MalformedLogDiscarded { log });
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    match serde_json::from_value(value) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!("Discarding '{}' with unexpected shape: {}", key, e);
            telemetry.record(TelemetryEvent::MalformedLogDiscarded { log });
            Ok(Vec::new())
        }
    }
}

/// Merges in-memory buffers into the durable logs and applies retention.
/// Delivery is at-least-once: a buffer is cleared only after its log was written.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    retention: Duration,
}

impl PersistenceGateway {
    pub fn new(retention: Duration) -> Self {
        Self { retention }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// The two logs are flushed independently; one failing does not block the other.
    pub fn flush<S: KeyValueStore + ?Sized>(
        &self,
        now: Timestamp,
        sleep_buffer: &mut CappedBuffer<SleepLogEntry>,
        adverse_buffer: &mut CappedBuffer<AdverseEvent>,
        last_adverse_event: Option<Timestamp>,
        store: &mut S,
        telemetry: &mut TelemetryRecorder,
    ) -> FlushSummary {
        let mut summary = FlushSummary::default();

        match self.flush_sleep_log(now, sleep_buffer, store, telemetry) {
            Ok((written, purged)) => {
                summary.sleep_written = written;
                summary.sleep_purged = purged;
            }
            Err(e) => {
                warn!("Failed to flush sleep log, keeping {} buffered entries: {}", sleep_buffer.len(), e);
                telemetry.record(TelemetryEvent::FlushFailed { log: LogKind::SleepLog });
                summary.failures += 1;
            }
        }

        match self.flush_adverse_events(adverse_buffer, store, telemetry) {
            Ok(written) => {
                summary.events_written = written;
                if written > 0 {
                    if let Some(at) = last_adverse_event {
                        if let Err(e) = store.write(LAST_ADVERSE_EVENT_KEY, &Value::from(at.millis)) {
                            warn!("Failed to persist last adverse event time: {}", e);
                            telemetry.record(TelemetryEvent::FlushFailed { log: LogKind::LastAdverseEvent });
                            summary.failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Failed to flush adverse events, keeping {} buffered: {}", adverse_buffer.len(), e);
                telemetry.record(TelemetryEvent::FlushFailed { log: LogKind::AdverseEvents });
                summary.failures += 1;
            }
        }

        if summary.is_clean() {
            debug!(
                "Flush complete: {} sleep entries written, {} purged, {} adverse events written",
                summary.sleep_written, summary.sleep_purged, summary.events_written
            );
        }
        summary
    }

    /// Read, append, purge by age, write back, clear. Returns (written, purged).
    fn flush_sleep_log<S: KeyValueStore + ?Sized>(
        &self,
        now: Timestamp,
        buffer: &mut CappedBuffer<SleepLogEntry>,
        store: &mut S,
        telemetry: &mut TelemetryRecorder,
    ) -> StoreResult<(usize, usize)> {
        let mut log: Vec<SleepLogEntry> = load_log(&*store, SLEEP_LOG_KEY, LogKind::SleepLog, telemetry)?;
        let written = buffer.len();
        log.extend(buffer.iter().cloned());

        let before = log.len();
        let cutoff = now.before(self.retention);
        log.retain(|entry| entry.time >= cutoff);
        let purged = before - log.len();

        if written == 0 && purged == 0 {
            return Ok((0, 0));
        }

        store.write(SLEEP_LOG_KEY, &serde_json::to_value(&log)?)?;
        buffer.clear();

        if purged > 0 {
            info!("Purged {} sleep log entries older than retention", purged);
        }
        telemetry.record(TelemetryEvent::FlushCompleted {
            log: LogKind::SleepLog,
            written: written as u64,
            purged: purged as u64,
        });
        Ok((written, purged))
    }

    // No age purge here: the durable adverse log is bounded only per flush by the buffer cap.
    fn flush_adverse_events<S: KeyValueStore + ?Sized>(
        &self,
        buffer: &mut CappedBuffer<AdverseEvent>,
        store: &mut S,
        telemetry: &mut TelemetryRecorder,
    ) -> StoreResult<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }

        let mut log: Vec<AdverseEvent> = load_log(&*store, ADVERSE_EVENTS_KEY, LogKind::AdverseEvents, telemetry)?;
        let written = buffer.len();
        log.extend(buffer.iter().cloned());

        store.write(ADVERSE_EVENTS_KEY, &serde_json::to_value(&log)?)?;
        buffer.clear();

        telemetry.record(TelemetryEvent::FlushCompleted {
            log: LogKind::AdverseEvents,
            written: written as u64,
            purged: 0,
        });
        Ok(written)
    }
}

/// Persisted debounce clock, if any. Unreadable values are ignored.
pub fn load_last_adverse_event<S: KeyValueStore + ?Sized>(store: &S) -> Option<Timestamp> {
    match store.read(LAST_ADVERSE_EVENT_KEY) {
        Ok(Some(value)) => value.as_u64().map(Timestamp::from_millis),
        Ok(None) => None,
        Err(e) => {
            warn!("Could not read last adverse event time: {}", e);
            None
        }
    }
}
