// alight_core/src/guidance/carrot.rs

use crate::config::CarrotConfig;
use crate::error::GuidanceError;
use nalgebra::Vector3;
use std::collections::VecDeque;

/// Result of one carrot update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarrotUpdate {
    /// The lookahead point to steer toward.
    Carrot(Vector3<f64>),
    /// The path is exhausted. Hold the final waypoint.
    Finished { final_waypoint: Vector3<f64> },
}

/// Carrot-chasing path follower over an ordered list of waypoints.
///
/// The active segment runs from `wp_start` to `wp_end`; the remaining
/// waypoints wait in `waypoints`. A segment is done when the vehicle comes
/// within `wp_threshold` of its end or passes abeam of it.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrotController {
    waypoints: VecDeque<Vector3<f64>>,
    wp_start: Vector3<f64>,
    wp_end: Vector3<f64>,
    look_ahead_dist: f64,
    wp_threshold: f64,
    initialized: bool,
}

impl CarrotController {
    pub fn new(config: &CarrotConfig) -> Self {
        Self {
            waypoints: VecDeque::new(),
            wp_start: Vector3::zeros(),
            wp_end: Vector3::zeros(),
            look_ahead_dist: config.look_ahead_dist,
            wp_threshold: config.wp_threshold,
            initialized: false,
        }
    }

    /// Loads a new path, replacing any previous one.
    pub fn load_waypoints(&mut self, waypoints: Vec<Vector3<f64>>) -> Result<(), GuidanceError> {
        if waypoints.len() < 2 {
            return Err(GuidanceError::NotEnoughWaypoints(waypoints.len()));
        }

        let mut waypoints = VecDeque::from(waypoints);
        // Checked above, both pops succeed.
        if let (Some(start), Some(end)) = (waypoints.pop_front(), waypoints.pop_front()) {
            self.wp_start = start;
            self.wp_end = end;
        }
        self.waypoints = waypoints;
        self.initialized = true;
        Ok(())
    }

    /// A closed square of side `size` in the horizontal plane starting at
    /// `origin`: forward along +x, then +y, then back.
    pub fn rectangular_loop(origin: Vector3<f64>, size: f64) -> Vec<Vector3<f64>> {
        vec![
            origin,
            origin + Vector3::new(size, 0.0, 0.0),
            origin + Vector3::new(size, size, 0.0),
            origin + Vector3::new(0.0, size, 0.0),
            origin,
        ]
    }

    /// The point on the active segment closest to `position`, and its
    /// parameter `t` along the segment (unclamped).
    pub fn closest_point(&self, position: &Vector3<f64>) -> (Vector3<f64>, f64) {
        let segment = self.wp_end - self.wp_start;
        let length_sq = segment.norm_squared();
        if length_sq <= f64::EPSILON {
            return (self.wp_end, 1.0);
        }

        let t = (position - self.wp_start).dot(&segment) / length_sq;
        (self.wp_start + segment * t.clamp(0.0, 1.0), t)
    }

    /// Computes the next carrot for a vehicle at `position`, advancing
    /// through the waypoints as segments are completed.
    pub fn update(&mut self, position: &Vector3<f64>) -> CarrotUpdate {
        loop {
            let (closest, t) = self.closest_point(position);
            let reached = (position - self.wp_end).norm() < self.wp_threshold;

            if !(reached || t >= 1.0) {
                return CarrotUpdate::Carrot(self.carrot_from(closest));
            }

            match self.waypoints.pop_front() {
                Some(next) => {
                    self.wp_start = self.wp_end;
                    self.wp_end = next;
                }
                None => {
                    self.initialized = false;
                    return CarrotUpdate::Finished {
                        final_waypoint: self.wp_end,
                    };
                }
            }
        }
    }

    fn carrot_from(&self, closest: Vector3<f64>) -> Vector3<f64> {
        let segment = self.wp_end - self.wp_start;
        let length = segment.norm();
        if length <= f64::EPSILON {
            return self.wp_end;
        }

        let carrot = closest + segment / length * self.look_ahead_dist;
        // Never run past the end of the segment.
        if (carrot - self.wp_start).norm() > length {
            self.wp_end
        } else {
            carrot
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn wp_start(&self) -> Vector3<f64> {
        self.wp_start
    }

    pub fn wp_end(&self) -> Vector3<f64> {
        self.wp_end
    }

    pub fn remaining_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.wp_start = Vector3::zeros();
        self.wp_end = Vector3::zeros();
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn straight_path() -> CarrotController {
        let mut carrot = CarrotController::new(&CarrotConfig::default());
        carrot
            .load_waypoints(vec![
                Vector3::new(0.0, 0.0, 5.0),
                Vector3::new(10.0, 0.0, 5.0),
                Vector3::new(10.0, 10.0, 5.0),
            ])
            .unwrap();
        carrot
    }

    #[test]
    fn test_needs_two_waypoints() {
        let mut carrot = CarrotController::new(&CarrotConfig::default());
        assert_eq!(
            carrot.load_waypoints(vec![Vector3::zeros()]),
            Err(GuidanceError::NotEnoughWaypoints(1))
        );
    }

    #[test]
    fn test_carrot_leads_along_segment() {
        let mut carrot = straight_path();
        // Vehicle off to the side of the first segment.
        match carrot.update(&Vector3::new(3.0, 2.0, 5.0)) {
            CarrotUpdate::Carrot(p) => {
                assert_abs_diff_eq!(p.x, 4.0, epsilon = 1e-12);
                assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
                assert_abs_diff_eq!(p.z, 5.0, epsilon = 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_carrot_is_clamped_to_segment_end() {
        let mut carrot = straight_path();
        match carrot.update(&Vector3::new(9.2, 1.0, 5.0)) {
            CarrotUpdate::Carrot(p) => assert_eq!(p, Vector3::new(10.0, 0.0, 5.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_advances_when_waypoint_reached() {
        let mut carrot = straight_path();
        let update = carrot.update(&Vector3::new(9.8, 0.0, 5.0));
        assert_eq!(carrot.wp_start(), Vector3::new(10.0, 0.0, 5.0));
        assert_eq!(carrot.wp_end(), Vector3::new(10.0, 10.0, 5.0));
        assert!(matches!(update, CarrotUpdate::Carrot(_)));
    }

    #[test]
    fn test_finishes_at_final_waypoint() {
        let mut carrot = straight_path();
        carrot.update(&Vector3::new(10.0, 0.0, 5.0));
        let update = carrot.update(&Vector3::new(10.0, 10.0, 5.0));
        assert_eq!(
            update,
            CarrotUpdate::Finished {
                final_waypoint: Vector3::new(10.0, 10.0, 5.0)
            }
        );
        assert!(!carrot.is_initialized());
    }

    #[test]
    fn test_rectangular_loop_returns_to_start() {
        let origin = Vector3::new(1.0, 2.0, 5.0);
        let path = CarrotController::rectangular_loop(origin, 5.0);
        assert_eq!(path.len(), 5);
        assert_eq!(path[1], Vector3::new(6.0, 2.0, 5.0));
        assert_eq!(path[2], Vector3::new(6.0, 7.0, 5.0));
        assert_eq!(path[4], origin);
    }
}
