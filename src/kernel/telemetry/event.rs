use serde::{Serialize, Deserialize};

// Allowed: Counts, Enums
// Forbidden: Magnitudes, Heart Rates, Timestamps of individual samples

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    AdverseEventEmitted,

    /// Above threshold but inside the debounce window.
    AdverseEventSuppressed,

    BufferEviction {
        buffer: BufferKind,
    },

    Consolidated {
        entries: u64,
    },

    FlushCompleted {
        log: LogKind,
        written: u64,
        purged: u64,
    },

    FlushFailed {
        log: LogKind,
    },

    /// Persisted data was unreadable and has been treated as empty.
    MalformedLogDiscarded {
        log: LogKind,
    },

    Lifecycle(LifecycleEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferKind {
    SleepLog,
    AdverseEvents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    SleepLog,
    AdverseEvents,
    LastAdverseEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    ReportGenerated,
    Reset,
    Shutdown,
}
