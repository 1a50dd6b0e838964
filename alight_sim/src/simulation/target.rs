// alight_sim/src/simulation/target.rs

use crate::simulation::config::TargetConfig;
use nalgebra::Vector3;

/// A landing pad on the ground: constant drift plus an optional circle.
#[derive(Debug, Clone)]
pub struct SimTarget {
    config: TargetConfig,
}

impl SimTarget {
    pub fn new(config: &TargetConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn position_at(&self, t: f64) -> Vector3<f64> {
        let [x, y, z] = self.config.start;
        let [vx, vy] = self.config.velocity;
        let mut p = Vector3::new(x + vx * t, y + vy * t, z);

        if let Some(radius) = self.config.circle_radius {
            // Starts at `start` and circles counter-clockwise around a center
            // `radius` to its left.
            let angle = self.config.angular_rate * t;
            p.x += radius * angle.sin();
            p.y += radius * (1.0 - angle.cos());
        }
        p
    }
}
