// alight_core/src/models/dynamics/constant_acceleration.rs

use crate::{
    frames::{FrameId, StateVariable},
    models::dynamics::Dynamics,
};
use nalgebra::{DMatrix, Vector3};

// --- Constant Acceleration Model ---
// Assumes the target continues to move with a slowly changing acceleration.
// The state includes position, velocity, and acceleration per axis, all in
// the body-planar frame.
#[derive(Debug, Clone)]
pub struct ConstantAccelerationModel {
    /// Spectral density of the jerk driving the acceleration random walk.
    pub jerk_noise_density: f64,
}

impl ConstantAccelerationModel {
    pub const STATE_DIM: usize = 9;

    pub fn new(jerk_noise_density: f64) -> Self {
        Self { jerk_noise_density }
    }
}

impl Default for ConstantAccelerationModel {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Dynamics for ConstantAccelerationModel {
    fn get_state_layout(&self) -> Vec<StateVariable> {
        let frame = FrameId::BodyPlanar;
        vec![
            StateVariable::Px(frame.clone()),
            StateVariable::Py(frame.clone()),
            StateVariable::Pz(frame.clone()),
            StateVariable::Vx(frame.clone()),
            StateVariable::Vy(frame.clone()),
            StateVariable::Vz(frame.clone()),
            StateVariable::Ax(frame.clone()),
            StateVariable::Ay(frame.clone()),
            StateVariable::Az(frame),
        ]
    }

    fn calculate_jacobian(&self) -> DMatrix<f64> {
        let mut a_jac = DMatrix::zeros(9, 9);

        // d(Px_dot)/d(Vx) = 1
        a_jac[(0, 3)] = 1.0;
        a_jac[(1, 4)] = 1.0;
        a_jac[(2, 5)] = 1.0;

        // d(Vx_dot)/d(Ax) = 1
        a_jac[(3, 6)] = 1.0;
        a_jac[(4, 7)] = 1.0;
        a_jac[(5, 8)] = 1.0;

        a_jac
    }

    fn transition_matrix(&self, dt: f64) -> DMatrix<f64> {
        // A is nilpotent (A^3 = 0), so exp(A dt) = I + A dt + A^2 dt^2 / 2 exactly.
        let a = self.calculate_jacobian();
        let a2 = &a * &a;
        DMatrix::identity(9, 9) + a * dt + a2 * (0.5 * dt * dt)
    }

    fn process_noise(&self, dt: f64) -> DMatrix<f64> {
        // Jerk enters each axis through G = [dt^3/6, dt^2/2, dt].
        let g = Vector3::new(dt.powi(3) / 6.0, dt.powi(2) / 2.0, dt);
        let block = g * g.transpose() * self.jerk_noise_density;

        let mut q = DMatrix::zeros(9, 9);
        for axis in 0..3 {
            for (bi, i) in [axis, axis + 3, axis + 6].into_iter().enumerate() {
                for (bj, j) in [axis, axis + 3, axis + 6].into_iter().enumerate() {
                    q[(i, j)] = block[(bi, bj)];
                }
            }
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::DVector;

    #[test]
    fn test_transition_integrates_constant_acceleration() {
        let model = ConstantAccelerationModel::default();
        let f = model.transition_matrix(2.0);

        // p = 1, v = 0.5, a = 0.25 on the x axis.
        let mut x = DVector::zeros(9);
        x[0] = 1.0;
        x[3] = 0.5;
        x[6] = 0.25;

        let next = f * x;
        // p + v t + a t^2 / 2 = 1 + 1 + 0.5
        assert_abs_diff_eq!(next[0], 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(next[3], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next[6], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(next[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_process_noise_is_symmetric_and_decoupled() {
        let model = ConstantAccelerationModel::new(2.0);
        let q = model.process_noise(0.1);

        assert_abs_diff_eq!((&q - q.transpose()).norm(), 0.0, epsilon = 1e-15);
        // No coupling between the x and y axes.
        assert_abs_diff_eq!(q[(0, 1)], 0.0);
        assert_abs_diff_eq!(q[(3, 7)], 0.0);
        // Acceleration variance grows as q * dt^2.
        assert_abs_diff_eq!(q[(6, 6)], 2.0 * 0.01, epsilon = 1e-15);
    }
}
