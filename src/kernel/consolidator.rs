use tracing::debug;

use crate::storage::types::SleepLogEntry;
use super::buffer::CappedBuffer;
use super::phase::Phase;
use super::time::Timestamp;
use super::tracker::PhaseTracker;
use super::telemetry::event::{BufferKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;

/// Converts the tracker's running totals into discrete, independently purgeable
/// log entries. Runs on the flush cadence and once more at shutdown.
#[derive(Debug, Clone)]
pub struct Consolidator {
    buffer: CappedBuffer<SleepLogEntry>,
}

impl Consolidator {
    pub fn new(cap: usize) -> Self {
        Self {
            buffer: CappedBuffer::new(cap),
        }
    }

    /// Returns the number of entries appended.
    pub fn tick(
        &mut self,
        now: Timestamp,
        tracker: &mut PhaseTracker,
        telemetry: &mut TelemetryRecorder,
    ) -> usize {
        // 1. No in-progress time may be lost across the flush boundary.
        tracker.close_interval(now);

        // 2 + 3. One entry per non-empty phase, totals zeroed.
        let totals = tracker.drain();
        let mut appended = 0;
        for phase in Phase::ALL {
            let millis = totals.get(phase);
            if millis == 0 {
                continue;
            }
            appended += 1;
            // 4. Lossy safety valve; retention purge is the real bound.
            if self.buffer.push(SleepLogEntry::new(now, phase, millis)).is_some() {
                telemetry.record(TelemetryEvent::BufferEviction { buffer: BufferKind::SleepLog });
            }
        }

        if appended > 0 {
            debug!("Consolidated {} sleep entries ({} buffered)", appended, self.buffer.len());
            telemetry.record(TelemetryEvent::Consolidated { entries: appended as u64 });
        }
        appended
    }

    pub fn buffer(&self) -> &CappedBuffer<SleepLogEntry> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut CappedBuffer<SleepLogEntry> {
        &mut self.buffer
    }
}
