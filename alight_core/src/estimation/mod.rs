// alight_core/src/estimation/mod.rs

use crate::error::EstimationError;
use crate::frames::FrameAwareState;
use nalgebra::DVector;

/// The inputs an estimator understands. Each one advances the filter by `dt`.
#[derive(Debug, Clone, Copy)]
pub enum EstimatorInput<'a> {
    /// No observation this tick: predict only.
    TimeStep { dt: f64 },
    /// Predict by `dt`, then fuse the measurement `z`.
    Measurement { z: &'a DVector<f64>, dt: f64 },
}

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the state of the target.
pub trait StateEstimator: Send + Sync {
    /// The single, unified method for processing all types of input data.
    fn process(&mut self, input: &EstimatorInput) -> Result<(), EstimationError>;

    /// Returns a reference to the current best estimate of the state.
    fn get_state(&self) -> &FrameAwareState;
}

pub mod filters;
