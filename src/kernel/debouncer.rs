use std::time::Duration;
use tracing::info;

use crate::storage::types::AdverseEvent;
use super::buffer::CappedBuffer;
use super::event::finite_magnitude;
use super::time::Timestamp;
use super::telemetry::event::{BufferKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;

/// Rate-limits high-magnitude samples into a capped buffer of adverse events.
/// At most one event per debounce window, even if every sample is a spike.
#[derive(Debug, Clone)]
pub struct EventDebouncer {
    threshold: f64,
    window: Duration,
    last_event: Option<Timestamp>,
    buffer: CappedBuffer<AdverseEvent>,
}

impl EventDebouncer {
    pub fn new(threshold: f64, window: Duration, cap: usize) -> Self {
        Self {
            threshold,
            window,
            last_event: None,
            buffer: CappedBuffer::new(cap),
        }
    }

    pub fn consider(
        &mut self,
        magnitude: f64,
        now: Timestamp,
        telemetry: &mut TelemetryRecorder,
    ) -> Option<AdverseEvent> {
        let magnitude = finite_magnitude(magnitude);
        if magnitude <= self.threshold {
            return None;
        }

        if let Some(last) = self.last_event {
            if now < last.after(self.window) {
                telemetry.record(TelemetryEvent::AdverseEventSuppressed);
                return None;
            }
        }

        self.last_event = Some(now);
        let event = AdverseEvent { time: now, magnitude };
        info!("Adverse event detected: magnitude {:.3}", magnitude);
        telemetry.record(TelemetryEvent::AdverseEventEmitted);

        if self.buffer.push(event.clone()).is_some() {
            telemetry.record(TelemetryEvent::BufferEviction { buffer: BufferKind::AdverseEvents });
        }
        Some(event)
    }

    pub fn last_event_time(&self) -> Option<Timestamp> {
        self.last_event
    }

    /// Seed the debounce clock, e.g. from a persisted value after restart.
    /// Never moves the clock backwards.
    pub fn restore_last_event_time(&mut self, at: Timestamp) {
        if self.last_event.map_or(true, |current| at > current) {
            self.last_event = Some(at);
        }
    }

    pub fn buffer(&self) -> &CappedBuffer<AdverseEvent> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut CappedBuffer<AdverseEvent> {
        &mut self.buffer
    }
}
