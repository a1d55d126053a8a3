use serde::{Deserialize, Serialize};
use super::time::Timestamp;

/// Standard gravity in the accelerometer's units (g).
pub const GRAVITY: f64 = 1.0;

/// Raw three-axis accelerometer reading, in g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the vector, gravity included.
    /// `hypot` keeps huge but finite readings finite instead of overflowing to inf.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y).hypot(self.z)
    }

    /// Motion intensity: how far the norm deviates from 1 g.
    /// A wrist at rest reads ~0 regardless of orientation.
    pub fn magnitude(&self) -> f64 {
        (self.norm() - GRAVITY).abs()
    }
}

/// A classified-once reading. Not retained past the handler that consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub magnitude: f64,
    pub heart_rate: Option<u16>,
}

impl Sample {
    pub fn new(timestamp: Timestamp, magnitude: f64, heart_rate: Option<u16>) -> Self {
        Self { timestamp, magnitude: finite_magnitude(magnitude), heart_rate }
    }
}

/// Clamp a magnitude into `[0, f64::MAX]`. NaN reads as no motion.
/// Everything persisted must be finite: JSON has no inf or NaN.
pub fn finite_magnitude(magnitude: f64) -> f64 {
    if magnitude.is_nan() {
        0.0
    } else {
        magnitude.clamp(0.0, f64::MAX)
    }
}

/// Everything that can happen on the engine's single timeline.
#[derive(Debug, Clone)]
pub enum Event {
    /// Accelerometer poll.
    Accel { at: Timestamp, accel: AccelSample },
    /// Heart-rate monitor update; cached, not correlated by timestamp.
    HeartRate { bpm: u16 },
    /// Periodic consolidation + flush.
    FlushTick { at: Timestamp },
    /// Wearer asked for the report.
    ReportRequested { at: Timestamp },
    /// Wearer asked to wipe all stored data.
    ResetRequested { at: Timestamp },
    /// Process termination. Final consolidation + flush.
    Shutdown { at: Timestamp },
}
