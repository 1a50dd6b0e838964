// alight_core/src/mission/heading.rs

use nalgebra::Vector2;
use std::collections::VecDeque;

/// A bounded history of horizontal, world-frame displacements from the
/// vehicle to the target. Their mean gives the heading that faces the
/// target, smoothed over detection noise.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetHeading {
    bearings: VecDeque<Vector2<f64>>,
    capacity: usize,
}

impl TargetHeading {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bearings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records one displacement, dropping the oldest once full.
    pub fn record(&mut self, displacement: Vector2<f64>) {
        if !(displacement.x.is_finite() && displacement.y.is_finite()) {
            return;
        }
        if self.bearings.len() == self.capacity {
            self.bearings.pop_front();
        }
        self.bearings.push_back(displacement);
    }

    /// World yaw (rad) pointing at the averaged displacement, or `None`
    /// while there is nothing to average or the mean is degenerate.
    pub fn yaw(&self) -> Option<f64> {
        if self.bearings.is_empty() {
            return None;
        }
        let sum = self
            .bearings
            .iter()
            .fold(Vector2::zeros(), |acc, b| acc + b);
        let mean = sum / self.bearings.len() as f64;
        if mean.norm() < f64::EPSILON {
            return None;
        }
        Some(mean.y.atan2(mean.x))
    }

    pub fn len(&self) -> usize {
        self.bearings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bearings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bearings.clear();
    }
}
