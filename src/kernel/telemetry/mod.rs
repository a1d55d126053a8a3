//! Engine telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (classification, debounce, flush).
//! It exists solely for observability and verification.
//!
//! # PRIVACY INVARIANT
//! Events carry counts and enums only, never raw sensor values or heart rates.

pub mod event;
pub mod metrics;
pub mod recorder;
