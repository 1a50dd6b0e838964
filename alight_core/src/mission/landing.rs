// alight_core/src/mission/landing.rs

use crate::config::LandingConfig;
use crate::types::Timestamp;
use nalgebra::Vector3;
use tracing::info;

/// Outcome of a periodic hover-height adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightAdjustment {
    Descend(f64),
    Recover(f64),
}

impl HeightAdjustment {
    pub fn height(&self) -> f64 {
        match *self {
            Self::Descend(h) | Self::Recover(h) => h,
        }
    }
}

/// Descent and disarm bookkeeping for the LANDING state.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingMonitor {
    config: LandingConfig,
    belief: u32,
    height_last_updated: Timestamp,
}

impl LandingMonitor {
    pub fn new(config: LandingConfig) -> Self {
        Self {
            config,
            belief: 0,
            height_last_updated: 0.0,
        }
    }

    /// Called on entering LANDING. Every landing attempt counts its belief
    /// from zero.
    pub fn start(&mut self, now: Timestamp) {
        self.belief = 0;
        self.height_last_updated = now;
    }

    /// True when both horizontal offsets are inside the alignment threshold.
    pub fn is_aligned(&self, offset: &Vector3<f64>) -> bool {
        offset.x.abs() < self.config.threshold[0] && offset.y.abs() < self.config.threshold[1]
    }

    /// Once every `period`, scales `height` down when aligned or back up when
    /// not. Only runs on ticks with a detection. Returns `None` when no
    /// adjustment was due.
    pub fn update_height(
        &mut self,
        height: f64,
        detected: bool,
        offset: &Vector3<f64>,
        now: Timestamp,
    ) -> Option<HeightAdjustment> {
        if !detected || now - self.height_last_updated < self.config.period {
            return None;
        }
        self.height_last_updated = now;

        let adjustment = if self.is_aligned(offset) {
            HeightAdjustment::Descend(height * self.config.descend_multiplier)
        } else {
            HeightAdjustment::Recover(height * self.config.recover_multiplier)
        };

        match adjustment {
            HeightAdjustment::Descend(h) => info!(height = h, "Lowering hover height"),
            HeightAdjustment::Recover(h) => info!(height = h, "Increasing hover height"),
        }
        Some(adjustment)
    }

    /// Whether an offset lies inside the disarm cutoff on all three axes.
    pub fn within_cutoff(&self, offset: &Vector3<f64>) -> bool {
        let [cx, cy, cz] = self.config.cutoff;
        offset.x.abs() < cx && offset.y.abs() < cy && offset.z.abs() < cz
    }

    /// The raw detection (when there is one) or the filtered estimate is
    /// inside the cutoff.
    pub fn within_landing_zone(
        &self,
        measured: Option<&Vector3<f64>>,
        estimated: &Vector3<f64>,
    ) -> bool {
        measured.is_some_and(|m| self.within_cutoff(m)) || self.within_cutoff(estimated)
    }

    /// Counts one more tick inside the landing zone. The counter only ever
    /// grows; returns true exactly on the tick it reaches the threshold.
    pub fn update_belief(&mut self, in_zone: bool) -> bool {
        if !in_zone || self.belief >= self.config.belief_threshold {
            return false;
        }
        self.belief += 1;
        self.belief == self.config.belief_threshold
    }

    pub fn belief(&self) -> u32 {
        self.belief
    }

    pub fn height_last_updated(&self) -> Timestamp {
        self.height_last_updated
    }

    pub fn config(&self) -> &LandingConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.belief = 0;
        self.height_last_updated = 0.0;
    }
}
