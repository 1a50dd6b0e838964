// alight_sim/src/simulation/detector.rs

use crate::simulation::config::DetectorConfig;
use alight_core::frames::world_to_body_planar;
use alight_core::types::{Pose, TargetObservation};
use anyhow::{Context, Result};
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// A downward-looking target detector: reports the body-planar offset of
/// the target when it lies inside the camera footprint.
#[derive(Debug, Clone)]
pub struct SimDetector {
    config: DetectorConfig,
    noise: Normal<f64>,
}

impl SimDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        let noise = Normal::new(0.0, config.noise_std)
            .context("detector.noise_std is not a valid standard deviation")?;
        Ok(Self {
            config: config.clone(),
            noise,
        })
    }

    /// Radius on the ground covered by the camera at `altitude`.
    pub fn footprint_radius(&self, altitude: f64) -> f64 {
        (altitude.max(0.0) * self.config.half_fov.tan()).max(self.config.min_footprint)
    }

    pub fn observe<R: Rng>(
        &self,
        vehicle: &Pose,
        target: &Vector3<f64>,
        rng: &mut R,
    ) -> TargetObservation {
        let delta = target - vehicle.position;
        let altitude = -delta.z;
        let horizontal = delta.xy().norm();

        if altitude < 0.0 || horizontal > self.footprint_radius(altitude) {
            return TargetObservation::missing();
        }
        if rng.gen_bool(self.config.dropout_probability) {
            return TargetObservation::missing();
        }

        let clean = world_to_body_planar(&delta, vehicle.yaw);
        let noise = Vector3::new(
            self.noise.sample(rng),
            self.noise.sample(rng),
            self.noise.sample(rng),
        );
        TargetObservation::detected(clean + noise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn perfect() -> SimDetector {
        SimDetector::new(&DetectorConfig {
            noise_std: 0.0,
            dropout_probability: 0.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_target_in_view_is_reported_in_body_frame() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let vehicle = Pose::new(0.0, 0.0, 4.0);
        let obs = perfect().observe(&vehicle, &Vector3::new(1.0, -1.0, 0.0), &mut rng);
        assert!(obs.detected);
        assert_eq!(obs.offset, Vector3::new(1.0, -1.0, 4.0));
    }

    #[test]
    fn test_target_outside_footprint_is_missed() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let vehicle = Pose::new(0.0, 0.0, 1.0);
        let obs = perfect().observe(&vehicle, &Vector3::new(10.0, 0.0, 0.0), &mut rng);
        assert!(!obs.detected);
    }

    #[test]
    fn test_dropout_always_misses() {
        let detector = SimDetector::new(&DetectorConfig {
            dropout_probability: 1.0,
            ..Default::default()
        })
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let obs = detector.observe(&Pose::new(0.0, 0.0, 2.0), &Vector3::zeros(), &mut rng);
        assert!(!obs.detected);
    }

    #[test]
    fn test_same_seed_same_noise() {
        let detector = SimDetector::new(&DetectorConfig::default()).unwrap();
        let vehicle = Pose::new(0.0, 0.0, 3.0);
        let target = Vector3::new(0.5, 0.5, 0.0);

        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(
                detector.observe(&vehicle, &target, &mut a),
                detector.observe(&vehicle, &target, &mut b)
            );
        }
    }
}
