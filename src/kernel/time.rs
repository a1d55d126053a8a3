use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock instant in milliseconds since the Unix epoch.
/// Serialized as a bare integer so persisted logs stay `{ "time": 1700000000000, ... }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    pub millis: u64,
}

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self { millis: secs * 1000 }
    }

    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { millis }
    }

    /// Milliseconds elapsed since `earlier`. Clock skew (earlier > self) yields 0.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.millis.saturating_sub(earlier.millis)
    }

    pub fn after(&self, d: Duration) -> Self {
        Self { millis: self.millis.saturating_add(d.as_millis() as u64) }
    }

    pub fn before(&self, d: Duration) -> Self {
        Self { millis: self.millis.saturating_sub(d.as_millis() as u64) }
    }
}
