// alight_core/src/models/dynamics/mod.rs

use crate::frames::StateVariable;
use dyn_clone::DynClone;
use nalgebra::DMatrix;
use std::fmt::Debug;

// --- DYNAMICS MODEL TRAIT ---
// Represents the motion model of the estimated entity. `x_k+1 = F(dt) x_k + w`
/// A linear, time-invariant motion model used by the target estimator.
///
/// Implementations describe their state layout, the discrete transition
/// matrix for a step of `dt` seconds, and the matching process noise.
pub trait Dynamics: DynClone + Debug + Send + Sync {
    /// Returns the complete layout of the state vector for this specific model.
    /// The order of this Vec defines the indices for the state vector `x`.
    fn get_state_layout(&self) -> Vec<StateVariable>;

    /// Returns the total number of states (the length of the state vector `x`).
    fn get_state_dim(&self) -> usize {
        self.get_state_layout().len()
    }

    /// The continuous-time Jacobian `A = ∂f/∂x` of `x_dot = f(x)`.
    fn calculate_jacobian(&self) -> DMatrix<f64>;

    /// The discrete transition matrix `F` for a step of `dt` seconds.
    fn transition_matrix(&self, dt: f64) -> DMatrix<f64>;

    /// The discrete process noise covariance `Q` for a step of `dt` seconds.
    fn process_noise(&self, dt: f64) -> DMatrix<f64>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn Dynamics>`.
dyn_clone::clone_trait_object!(Dynamics);

pub mod constant_acceleration;
