use serde::{Deserialize, Serialize};

use super::queue::QUEUE_CAP;

pub const BATCH_SIZE: usize = 30;
pub const KNOWN_DELAY: u64 = 999;
pub const CYCLE_DAYS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub known: f64,
    pub familiar: f64,
    pub not_quite: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            known: 90.0,
            familiar: 75.0,
            not_quite: 50.0,
        }
    }
}

/// Batches until a word becomes eligible again, per classification bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReexposureDelays {
    pub known: u64,
    pub familiar: u64,
    pub not_quite: u64,
    pub new: u64,
}

impl Default for ReexposureDelays {
    fn default() -> Self {
        Self {
            known: KNOWN_DELAY,
            familiar: 6,
            not_quite: 3,
            new: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    pub queue_cap: usize,
    pub max_batches_per_cycle: u32,
    pub default_mode: u32,
    pub default_level: String,
    /// Tri-day total (0..=3) at which a word counts as strong.
    pub strong_total: f64,
    pub thresholds: ClassificationThresholds,
    pub delays: ReexposureDelays,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            queue_cap: QUEUE_CAP,
            max_batches_per_cycle: 5,
            default_mode: 2,
            default_level: "beginner".to_string(),
            strong_total: 2.5,
            thresholds: ClassificationThresholds::default(),
            delays: ReexposureDelays::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn clamp_mode(&self, mode: u32) -> u32 {
        mode.clamp(1, self.max_batches_per_cycle.max(1))
    }
}
