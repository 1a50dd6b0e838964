// alight_core/src/estimation/filters/kf.rs

use crate::error::EstimationError;
use crate::estimation::{EstimatorInput, StateEstimator};
use crate::frames::FrameAwareState;
use crate::models::dynamics::Dynamics;
use crate::models::measurement::Measurement;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// A linear Kalman filter over a [`Dynamics`] model and a single
/// [`Measurement`] model.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    /// The current state of the filter (x, P, t).
    state: FrameAwareState,
    dynamics: Box<dyn Dynamics>,
    measurement_model: Box<dyn Measurement>,
}

impl KalmanFilter {
    /// Creates a new filter. The initial state must use the dynamics model's layout size.
    pub fn new(
        initial_state: FrameAwareState,
        dynamics: Box<dyn Dynamics>,
        measurement_model: Box<dyn Measurement>,
    ) -> Result<Self, EstimationError> {
        let expected = dynamics.get_state_dim();
        if initial_state.dim() != expected || initial_state.vector.len() != expected {
            return Err(EstimationError::DimensionMismatch {
                expected,
                actual: initial_state.vector.len(),
            });
        }

        Ok(Self {
            state: initial_state,
            dynamics,
            measurement_model,
        })
    }

    // --- Kalman Filter Algorithm ---

    /// Advances the state by `dt` seconds.
    pub fn predict(&mut self, dt: f64) -> Result<(), EstimationError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(EstimationError::DegenerateTiming(dt));
        }

        let f = self.dynamics.transition_matrix(dt);
        let q = self.dynamics.process_noise(dt);

        // x_k+1 = F x_k,  P_k+1 = F P_k F^T + Q
        self.state.vector = &f * &self.state.vector;
        self.state.covariance = &f * &self.state.covariance * f.transpose() + q;
        self.state.last_update_timestamp += dt;
        Ok(())
    }

    /// Fuses a measurement vector. A singular innovation covariance skips the
    /// update and leaves the state untouched.
    pub fn update(&mut self, z: &DVector<f64>) -> Result<(), EstimationError> {
        let expected = self.measurement_model.get_measurement_dim();
        if z.len() != expected {
            return Err(EstimationError::DimensionMismatch {
                expected,
                actual: z.len(),
            });
        }

        let h = self.measurement_model.calculate_jacobian(&self.state);
        let r = self.measurement_model.get_r();

        let y = z - &h * &self.state.vector;
        let s = &h * &self.state.covariance * h.transpose() + r;

        let Some(s_inv) = s.try_inverse() else {
            debug!("Innovation covariance not invertible, skipping update");
            return Err(EstimationError::SingularInnovation);
        };

        let k_gain = &self.state.covariance * h.transpose() * s_inv;
        self.state.vector += &k_gain * y;
        let i = DMatrix::<f64>::identity(self.state.dim(), self.state.dim());
        self.state.covariance = (i - k_gain * h) * &self.state.covariance;
        Ok(())
    }
}

impl StateEstimator for KalmanFilter {
    fn process(&mut self, input: &EstimatorInput) -> Result<(), EstimationError> {
        match input {
            EstimatorInput::TimeStep { dt } => self.predict(*dt),
            EstimatorInput::Measurement { z, dt } => {
                self.predict(*dt)?;
                self.update(z)
            }
        }
    }

    fn get_state(&self) -> &FrameAwareState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dynamics::constant_acceleration::ConstantAccelerationModel;
    use crate::models::measurement::relative_position::RelativePositionModel;
    use approx::assert_abs_diff_eq;

    fn filter_at(position: [f64; 3]) -> KalmanFilter {
        let dynamics = ConstantAccelerationModel::default();
        let mut state = FrameAwareState::new(dynamics.get_state_layout(), 1.0, 0.0);
        state.vector[0] = position[0];
        state.vector[1] = position[1];
        state.vector[2] = position[2];
        KalmanFilter::new(
            state,
            Box::new(dynamics),
            Box::new(RelativePositionModel::isotropic(0.1)),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_rejects_non_positive_dt() {
        let mut kf = filter_at([1.0, 2.0, 3.0]);
        assert_eq!(kf.predict(0.0), Err(EstimationError::DegenerateTiming(0.0)));
        assert!(kf.predict(-0.1).is_err());
        assert!(kf.predict(f64::NAN).is_err());
        assert_abs_diff_eq!(kf.get_state().last_update_timestamp, 0.0);
    }

    #[test]
    fn test_prediction_grows_uncertainty() {
        let mut kf = filter_at([1.0, 2.0, 3.0]);
        let p0 = kf.get_state().covariance[(0, 0)];
        kf.process(&EstimatorInput::TimeStep { dt: 0.1 }).unwrap();
        assert!(kf.get_state().covariance[(0, 0)] > p0);
        // No velocity, so the position is unchanged.
        assert_abs_diff_eq!(kf.get_state().vector[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update_pulls_estimate_toward_measurement() {
        let mut kf = filter_at([0.0, 0.0, 5.0]);
        let z = DVector::from_vec(vec![1.0, 0.0, 5.0]);
        for _ in 0..20 {
            kf.process(&EstimatorInput::Measurement { z: &z, dt: 0.05 })
                .unwrap();
        }
        assert_abs_diff_eq!(kf.get_state().vector[0], 1.0, epsilon = 0.05);
        assert_abs_diff_eq!(kf.get_state().vector[2], 5.0, epsilon = 0.05);
    }

    #[test]
    fn test_update_rejects_wrong_measurement_size() {
        let mut kf = filter_at([0.0, 0.0, 0.0]);
        let z = DVector::from_vec(vec![1.0, 2.0]);
        assert_eq!(
            kf.update(&z),
            Err(EstimationError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}
