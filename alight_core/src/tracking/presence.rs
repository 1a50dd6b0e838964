// alight_core/src/tracking/presence.rs

use crate::types::{TargetObservation, Timestamp};
use nalgebra::Vector3;

/// Presence and loss bookkeeping for the target.
///
/// This layer is deliberately blunt: as soon as the target has been unseen
/// for longer than `lost_threshold_ms` it reports a zero position and
/// velocity, regardless of what the estimator is still coasting on.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPresence {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    detected: bool,
    first_seen: Option<Timestamp>,
    last_seen: Option<Timestamp>,
    lost_threshold_ms: f64,
}

impl TargetPresence {
    pub fn new(lost_threshold_ms: f64) -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            detected: false,
            first_seen: None,
            last_seen: None,
            lost_threshold_ms,
        }
    }

    /// Records the observation made at `now`.
    pub fn observe(&mut self, observation: &TargetObservation, now: Timestamp) {
        if observation.detected {
            let was_lost = self.is_lost(now);
            if was_lost {
                self.first_seen = Some(now);
            }
            self.velocity = match self.last_seen {
                Some(last) if now > last && !was_lost => {
                    (observation.offset - self.position) / (now - last)
                }
                _ => Vector3::zeros(),
            };
            self.position = observation.offset;
            self.last_seen = Some(now);
            self.detected = true;
            return;
        }

        self.detected = false;
        if self.is_lost(now) {
            self.position = Vector3::zeros();
            self.velocity = Vector3::zeros();
        }
    }

    /// `now - last_seen > lost_threshold`. A target that was never seen is lost.
    pub fn is_lost(&self, now: Timestamp) -> bool {
        match self.last_seen {
            Some(last) => (now - last) * 1000.0 > self.lost_threshold_ms,
            None => true,
        }
    }

    /// Whether the most recent observation was a detection.
    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// The last observed offset, or zero once the target is lost.
    pub fn position(&self, now: Timestamp) -> Vector3<f64> {
        if self.is_lost(now) {
            Vector3::zeros()
        } else {
            self.position
        }
    }

    /// Finite-difference velocity between the last two detections, or zero
    /// once the target is lost.
    pub fn velocity(&self, now: Timestamp) -> Vector3<f64> {
        if self.is_lost(now) {
            Vector3::zeros()
        } else {
            self.velocity
        }
    }

    pub fn first_seen(&self) -> Option<Timestamp> {
        self.first_seen
    }

    pub fn last_seen(&self) -> Option<Timestamp> {
        self.last_seen
    }

    /// How long the target has been continuously present, zero while lost.
    pub fn tracked_duration(&self, now: Timestamp) -> f64 {
        match self.first_seen {
            Some(first) if !self.is_lost(now) => now - first,
            _ => 0.0,
        }
    }

    /// Seconds since the target was last seen. `None` if it never was.
    pub fn time_since_seen(&self, now: Timestamp) -> Option<f64> {
        self.last_seen.map(|last| now - last)
    }

    pub fn lost_threshold_ms(&self) -> f64 {
        self.lost_threshold_ms
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.lost_threshold_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lost_after_threshold_resets_position() {
        let mut presence = TargetPresence::new(1000.0);
        let obs = TargetObservation::detected(Vector3::new(1.0, -2.0, 4.0));

        presence.observe(&obs, 0.0);
        assert!(!presence.is_lost(0.0));
        assert!(!presence.is_lost(0.999));
        assert_eq!(presence.position(0.5), Vector3::new(1.0, -2.0, 4.0));

        presence.observe(&TargetObservation::missing(), 1.5);
        assert!(presence.is_lost(1.5));
        assert!(!presence.is_detected());
        assert_eq!(presence.position(1.5), Vector3::zeros());
        assert_eq!(presence.velocity(1.5), Vector3::zeros());
    }

    #[test]
    fn test_missing_observation_keeps_timestamps() {
        let mut presence = TargetPresence::new(1000.0);
        presence.observe(&TargetObservation::detected(Vector3::x()), 2.0);
        presence.observe(&TargetObservation::missing(), 2.5);

        assert_eq!(presence.last_seen(), Some(2.0));
        assert_eq!(presence.first_seen(), Some(2.0));
        assert!(!presence.is_lost(2.5));
        assert_eq!(presence.position(2.5), Vector3::x());
    }

    #[test]
    fn test_first_seen_restarts_after_loss() {
        let mut presence = TargetPresence::new(500.0);
        let obs = TargetObservation::detected(Vector3::new(0.5, 0.0, 3.0));
        presence.observe(&obs, 0.0);
        presence.observe(&obs, 0.2);
        assert_abs_diff_eq!(presence.tracked_duration(0.2), 0.2, epsilon = 1e-12);

        presence.observe(&obs, 2.0);
        assert_eq!(presence.first_seen(), Some(2.0));
        assert_abs_diff_eq!(presence.tracked_duration(2.1), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_velocity_from_consecutive_detections() {
        let mut presence = TargetPresence::new(1000.0);
        presence.observe(&TargetObservation::detected(Vector3::new(1.0, 0.0, 2.0)), 0.0);
        presence.observe(&TargetObservation::detected(Vector3::new(1.5, 0.0, 2.0)), 0.5);
        assert_abs_diff_eq!(presence.velocity(0.5).x, 1.0, epsilon = 1e-12);
    }
}
