use std::collections::VecDeque;
use super::event::{BufferKind, LifecycleEvent, LogKind, TelemetryEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub adverse_stats: AdverseStats,
    pub buffer_stats: BufferStats,
    pub flush_stats: FlushStats,
    pub lifecycle_stats: LifecycleStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdverseStats {
    pub emitted: u64,
    pub suppressed: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferStats {
    pub consolidations: u64,
    pub entries_consolidated: u64,
    pub sleep_evictions: u64,
    pub adverse_evictions: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushStats {
    pub sleep_flushes: u64,
    pub adverse_flushes: u64,
    pub entries_written: u64,
    pub entries_purged: u64,
    pub failures: u64,
    pub malformed_discards: u64,
    /// failures / (successes + failures); 0 when nothing was attempted.
    pub failure_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifecycleStats {
    pub reports: u64,
    pub resets: u64,
    pub shutdowns: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::AdverseEventEmitted => snap.adverse_stats.emitted += 1,
            TelemetryEvent::AdverseEventSuppressed => snap.adverse_stats.suppressed += 1,
            TelemetryEvent::BufferEviction { buffer } => match buffer {
                BufferKind::SleepLog => snap.buffer_stats.sleep_evictions += 1,
                BufferKind::AdverseEvents => snap.buffer_stats.adverse_evictions += 1,
            },
            TelemetryEvent::Consolidated { entries } => {
                snap.buffer_stats.consolidations += 1;
                snap.buffer_stats.entries_consolidated += entries;
            }
            TelemetryEvent::FlushCompleted { log, written, purged } => {
                match log {
                    LogKind::SleepLog => snap.flush_stats.sleep_flushes += 1,
                    LogKind::AdverseEvents => snap.flush_stats.adverse_flushes += 1,
                    LogKind::LastAdverseEvent => {} // Bookkeeping write, not a log flush
                }
                snap.flush_stats.entries_written += written;
                snap.flush_stats.entries_purged += purged;
            }
            TelemetryEvent::FlushFailed { .. } => snap.flush_stats.failures += 1,
            TelemetryEvent::MalformedLogDiscarded { .. } => snap.flush_stats.malformed_discards += 1,
            TelemetryEvent::Lifecycle(kind) => match kind {
                LifecycleEvent::ReportGenerated => snap.lifecycle_stats.reports += 1,
                LifecycleEvent::Reset => snap.lifecycle_stats.resets += 1,
                LifecycleEvent::Shutdown => snap.lifecycle_stats.shutdowns += 1,
            },
        }
    }

    let attempts = snap.flush_stats.sleep_flushes + snap.flush_stats.adverse_flushes + snap.flush_stats.failures;
    if attempts > 0 {
        snap.flush_stats.failure_ratio = snap.flush_stats.failures as f64 / attempts as f64;
    }

    snap
}
