// alight_core/src/types.rs

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---

/// Seconds on a monotonic timeline. Never wall-clock time.
pub type Timestamp = f64;

// =========================================================================
// == Per-Tick Inputs ==
// =========================================================================

/// The vehicle pose in the world frame, as delivered by the external
/// localization system. Read-only to the core.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Default::default()
        }
    }

    pub fn with_attitude(mut self, roll: f64, pitch: f64, yaw: f64) -> Self {
        self.roll = roll;
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.roll.is_finite()
            && self.pitch.is_finite()
            && self.yaw.is_finite()
    }
}

/// The output of the external target detector for a single tick.
///
/// `offset` is the target position relative to the vehicle, already expressed
/// in the body-planar frame (see [`crate::frames`]). It is meaningless when
/// `detected` is false.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetObservation {
    pub detected: bool,
    pub offset: Vector3<f64>,
}

impl TargetObservation {
    pub fn detected(offset: Vector3<f64>) -> Self {
        Self {
            detected: true,
            offset,
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    /// A detection flagged true but carrying a non-finite offset is treated as
    /// no detection at all.
    pub fn sanitized(&self) -> Self {
        if self.detected && self.offset.iter().all(|v| v.is_finite()) {
            *self
        } else {
            Self::missing()
        }
    }
}

// =========================================================================
// == Per-Tick Output ==
// =========================================================================

/// Attitude and collective throttle for the flight-controller bridge.
/// Angles are in radians, throttle is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AttitudeCommand {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub throttle: f64,
}

impl AttitudeCommand {
    /// Level attitude at the given heading and throttle.
    pub fn level(yaw: f64, throttle: f64) -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            yaw,
            throttle,
        }
    }

    /// The same attitude expressed as a unit quaternion, for bridges that
    /// consume `SET_ATTITUDE_TARGET` style messages.
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.roll, self.pitch, self.yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quaternion_round_trips_euler_angles() {
        let cmd = AttitudeCommand {
            roll: 0.1,
            pitch: -0.2,
            yaw: 1.0,
            throttle: 0.5,
        };
        let (roll, pitch, yaw) = cmd.to_quaternion().euler_angles();
        assert_abs_diff_eq!(roll, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(pitch, -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(yaw, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_detection_is_dropped() {
        let obs = TargetObservation::detected(Vector3::new(f64::NAN, 0.0, 1.0));
        assert!(!obs.sanitized().detected);

        let obs = TargetObservation::detected(Vector3::new(1.0, 0.0, 1.0));
        assert_eq!(obs.sanitized(), obs);
    }
}
