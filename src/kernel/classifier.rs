use crate::config::{ClassifierConfig, ClassifierStrategy};
use super::event::Sample;
use super::phase::Phase;

/// Maps a sample to a sleep phase.
/// Pure and total: every input yields exactly one phase, nothing is mutated.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, sample: &Sample) -> Phase {
        match self.config.strategy {
            ClassifierStrategy::MagnitudeOnly => self.by_magnitude(sample.magnitude),
            ClassifierStrategy::MagnitudeHeartRate => {
                self.by_magnitude_and_heart_rate(sample.magnitude, sample.heart_rate)
            }
        }
    }

    fn by_magnitude(&self, magnitude: f64) -> Phase {
        if magnitude < self.config.deep_threshold {
            Phase::DeepSleep
        } else if magnitude < self.config.light_threshold {
            Phase::LightSleep
        } else {
            Phase::Awake
        }
    }

    // No heart-rate reading yet: Awake, never blocks.
    fn by_magnitude_and_heart_rate(&self, magnitude: f64, heart_rate: Option<u16>) -> Phase {
        let Some(bpm) = heart_rate else {
            return Phase::Awake;
        };
        if bpm < self.config.hr_deep_threshold && magnitude < self.config.deep_threshold {
            Phase::DeepSleep
        } else if bpm < self.config.hr_light_threshold && magnitude < self.config.light_threshold {
            Phase::LightSleep
        } else {
            Phase::Awake
        }
    }
}
