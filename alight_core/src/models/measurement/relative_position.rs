// alight_core/src/models/measurement/relative_position.rs

use crate::frames::{FrameAwareState, FrameId, StateVariable};
use crate::models::measurement::Measurement;
use nalgebra::DMatrix;

/// The detector's body-planar target offset, observed directly as the
/// position part of the estimator state.
#[derive(Debug, Clone)]
pub struct RelativePositionModel {
    // The R matrix for this sensor
    pub noise_covariance: DMatrix<f64>,
}

impl RelativePositionModel {
    /// Isotropic noise with standard deviation `sigma` on every axis.
    pub fn isotropic(sigma: f64) -> Self {
        Self {
            noise_covariance: DMatrix::identity(3, 3) * (sigma * sigma),
        }
    }
}

impl Measurement for RelativePositionModel {
    fn get_measurement_layout(&self) -> Vec<StateVariable> {
        vec![
            StateVariable::Px(FrameId::BodyPlanar),
            StateVariable::Py(FrameId::BodyPlanar),
            StateVariable::Pz(FrameId::BodyPlanar),
        ]
    }

    fn get_r(&self) -> &DMatrix<f64> {
        &self.noise_covariance
    }

    fn calculate_jacobian(&self, filter_state: &FrameAwareState) -> DMatrix<f64> {
        // The Jacobian H must be size (measurement_dims x state_dims) -> 3x9
        let layout = self.get_measurement_layout();
        let mut h_jac = DMatrix::zeros(layout.len(), filter_state.dim());

        for (row, var) in layout.iter().enumerate() {
            if let Some(col) = filter_state.find_idx(var) {
                h_jac[(row, col)] = 1.0;
            }
        }

        h_jac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dynamics::{constant_acceleration::ConstantAccelerationModel, Dynamics};

    #[test]
    fn test_jacobian_selects_position_block() {
        let layout = ConstantAccelerationModel::default().get_state_layout();
        let state = FrameAwareState::new(layout, 1.0, 0.0);
        let h = RelativePositionModel::isotropic(0.1).calculate_jacobian(&state);

        assert_eq!(h.shape(), (3, 9));
        assert_eq!(h[(0, 0)], 1.0);
        assert_eq!(h[(1, 1)], 1.0);
        assert_eq!(h[(2, 2)], 1.0);
        assert_eq!(h.sum(), 3.0);
    }
}
