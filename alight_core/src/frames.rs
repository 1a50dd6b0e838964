// alight_core/src/frames.rs

use nalgebra::{DMatrix, DVector, Rotation3, Vector3};
use std::hash::Hash;

// --- Body-planar convention ---
// x points forward along the vehicle heading, y points left, and z is the
// height of the vehicle above the target (positive while airborne). Roll and
// pitch are removed, only yaw relates it to the world frame.

/// Rotates a world-frame vector into the heading of a vehicle at `yaw`.
/// z is left as is (up stays up).
pub fn rotate_to_heading(v: &Vector3<f64>, yaw: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -yaw) * v
}

/// Expresses a world-frame displacement `target - vehicle` in the body-planar
/// frame of a vehicle heading `yaw`.
pub fn world_to_body_planar(delta_world: &Vector3<f64>, yaw: f64) -> Vector3<f64> {
    let planar = rotate_to_heading(delta_world, yaw);
    Vector3::new(planar.x, planar.y, -delta_world.z)
}

/// The inverse of [`world_to_body_planar`]: returns `target - vehicle` in the
/// world frame.
pub fn body_planar_to_world(offset: &Vector3<f64>, yaw: f64) -> Vector3<f64> {
    let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), yaw);
    let planar = rot * Vector3::new(offset.x, offset.y, 0.0);
    Vector3::new(planar.x, planar.y, -offset.z)
}

/// A unique, hashable identifier for the coordinate frames the core reasons in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameId {
    /// The global frame the localization system reports poses in.
    World,
    /// Vehicle-centered, yaw-aligned frame used for target offsets.
    BodyPlanar,
}

/// Every variable that can exist in an estimator state vector.
/// The FrameId specifies which frame the variable is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateVariable {
    // --- Cartesian Position ---
    Px(FrameId),
    Py(FrameId),
    Pz(FrameId),
    // --- Cartesian Velocity ---
    Vx(FrameId),
    Vy(FrameId),
    Vz(FrameId),
    // --- Cartesian Acceleration ---
    Ax(FrameId),
    Ay(FrameId),
    Az(FrameId),
}

/// The state object used by filters. It bundles the state vector
/// with its schema (the layout), covariance, and timestamp.
#[derive(Debug, Clone)]
pub struct FrameAwareState {
    /// The ordered "schema" of the state vector.
    pub layout: Vec<StateVariable>,
    /// The actual numerical data vector `x`.
    pub vector: DVector<f64>,
    /// The covariance matrix `P`.
    pub covariance: DMatrix<f64>,
    /// Accumulated filter time, advanced by every predict step.
    pub last_update_timestamp: f64,
}

impl FrameAwareState {
    /// Creates a zero state with a given layout and the covariance set to a
    /// scaled identity matrix.
    pub fn new(layout: Vec<StateVariable>, initial_covariance_val: f64, timestamp: f64) -> Self {
        let dim = layout.len();
        Self {
            layout,
            vector: DVector::zeros(dim),
            covariance: DMatrix::identity(dim, dim) * initial_covariance_val,
            last_update_timestamp: timestamp,
        }
    }

    /// Returns the dimension (number of rows) of the state vector.
    pub fn dim(&self) -> usize {
        self.layout.len()
    }

    /// Finds the index of a specific `StateVariable` in the layout.
    pub fn find_idx(&self, var: &StateVariable) -> Option<usize> {
        self.layout.iter().position(|v| v == var)
    }

    /// Reads three consecutive entries starting at `first`, e.g. `Px` gives
    /// the position triple. `None` if the layout does not contain `first` or
    /// the vector is too short.
    pub fn get_vector3(&self, first: &StateVariable) -> Option<Vector3<f64>> {
        let idx = self.find_idx(first)?;
        if idx + 3 > self.vector.len() {
            return None;
        }
        Some(Vector3::new(
            self.vector[idx],
            self.vector[idx + 1],
            self.vector[idx + 2],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vector3_approx_eq(v1: &Vector3<f64>, v2: &Vector3<f64>, epsilon: f64) {
        assert_abs_diff_eq!(v1.x, v2.x, epsilon = epsilon);
        assert_abs_diff_eq!(v1.y, v2.y, epsilon = epsilon);
        assert_abs_diff_eq!(v1.z, v2.z, epsilon = epsilon);
    }

    #[test]
    fn test_body_planar_identity_heading() {
        // Target 2m ahead, 1m left, vehicle 5m above it.
        let delta = Vector3::new(2.0, 1.0, -5.0);
        let offset = world_to_body_planar(&delta, 0.0);
        assert_vector3_approx_eq(&offset, &Vector3::new(2.0, 1.0, 5.0), 1e-12);
    }

    #[test]
    fn test_body_planar_removes_yaw() {
        // Heading north (yaw 90 deg), target due north is straight ahead.
        let delta = Vector3::new(0.0, 3.0, -2.0);
        let offset = world_to_body_planar(&delta, FRAC_PI_2);
        assert_vector3_approx_eq(&offset, &Vector3::new(3.0, 0.0, 2.0), 1e-12);

        let back = body_planar_to_world(&offset, FRAC_PI_2);
        assert_vector3_approx_eq(&back, &delta, 1e-12);
    }

    #[test]
    fn test_get_vector3_reads_position_triple() {
        let layout = vec![
            StateVariable::Px(FrameId::BodyPlanar),
            StateVariable::Py(FrameId::BodyPlanar),
            StateVariable::Pz(FrameId::BodyPlanar),
        ];
        let mut state = FrameAwareState::new(layout, 1.0, 0.0);
        state.vector[1] = 4.0;
        let p = state
            .get_vector3(&StateVariable::Px(FrameId::BodyPlanar))
            .unwrap();
        assert_vector3_approx_eq(&p, &Vector3::new(0.0, 4.0, 0.0), 1e-12);
        assert!(state
            .get_vector3(&StateVariable::Vx(FrameId::BodyPlanar))
            .is_none());
    }
}
