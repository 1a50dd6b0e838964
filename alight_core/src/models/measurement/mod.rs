// alight_core/src/models/measurement/mod.rs

use crate::frames::{FrameAwareState, StateVariable};
use dyn_clone::DynClone;
use nalgebra::DMatrix;
use std::fmt::Debug;

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a sensor. `z = H x + v`
pub trait Measurement: DynClone + Debug + Send + Sync {
    /// Describes the layout of the measurement vector `z`.
    fn get_measurement_layout(&self) -> Vec<StateVariable>;

    fn get_measurement_dim(&self) -> usize {
        self.get_measurement_layout().len()
    }

    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> &DMatrix<f64>;

    /// Calculates the observation matrix `H` for the given filter state layout.
    fn calculate_jacobian(&self, filter_state: &FrameAwareState) -> DMatrix<f64>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn Measurement>`.
dyn_clone::clone_trait_object!(Measurement);

pub mod relative_position;
