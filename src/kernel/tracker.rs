use super::phase::{Phase, PhaseDurations};
use super::time::Timestamp;

/// Turns a stream of (phase, time) observations into per-phase elapsed time.
///
/// Each elapsed interval is attributed to the phase held *during* it, i.e. the
/// previous observation's phase. A later sample never reclassifies past time.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    // Invariant: current_phase.is_some() == phase_start.is_some()
    current: Option<(Phase, Timestamp)>,
    accumulated: PhaseDurations,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current.map(|(phase, _)| phase)
    }

    pub fn phase_start(&self) -> Option<Timestamp> {
        self.current.map(|(_, start)| start)
    }

    pub fn accumulated(&self) -> &PhaseDurations {
        &self.accumulated
    }

    /// Record that `phase` holds from `now` on.
    pub fn observe(&mut self, phase: Phase, now: Timestamp) {
        self.close_interval(now);
        self.current = Some((phase, now));
    }

    /// Flush the in-progress interval into the totals without changing the
    /// current phase; the interval restarts at `now`.
    pub fn close_interval(&mut self, now: Timestamp) {
        if let Some((phase, start)) = self.current {
            self.accumulated.add(phase, now.millis_since(start));
            self.current = Some((phase, now));
        }
    }

    /// Hand the totals to the caller and zero them.
    pub fn drain(&mut self) -> PhaseDurations {
        std::mem::take(&mut self.accumulated)
    }

    /// Discard totals and the in-progress interval; tracking resumes from `now`.
    pub fn reset(&mut self, now: Timestamp) {
        self.accumulated.clear();
        if let Some((phase, _)) = self.current {
            self.current = Some((phase, now));
        }
    }
}
