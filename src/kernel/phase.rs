use serde::{Deserialize, Serialize};

/// Sleep phase label. Closed set; every match over it is exhaustive.
/// Persisted with the human-readable labels the device logs have always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Deep Sleep")]
    DeepSleep,
    #[serde(rename = "Light Sleep")]
    LightSleep,
    #[serde(rename = "Awake")]
    Awake,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::DeepSleep, Phase::LightSleep, Phase::Awake];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::DeepSleep => "Deep Sleep",
            Phase::LightSleep => "Light Sleep",
            Phase::Awake => "Awake",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-phase elapsed time in milliseconds.
/// Integer millis keep the "no time lost or double-counted" sum exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseDurations {
    pub deep_ms: u64,
    pub light_ms: u64,
    pub awake_ms: u64,
}

impl PhaseDurations {
    pub fn get(&self, phase: Phase) -> u64 {
        match phase {
            Phase::DeepSleep => self.deep_ms,
            Phase::LightSleep => self.light_ms,
            Phase::Awake => self.awake_ms,
        }
    }

    pub fn add(&mut self, phase: Phase, millis: u64) {
        let slot = match phase {
            Phase::DeepSleep => &mut self.deep_ms,
            Phase::LightSleep => &mut self.light_ms,
            Phase::Awake => &mut self.awake_ms,
        };
        *slot = slot.saturating_add(millis);
    }

    pub fn total_ms(&self) -> u64 {
        self.deep_ms + self.light_ms + self.awake_ms
    }

    pub fn is_zero(&self) -> bool {
        self.total_ms() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
