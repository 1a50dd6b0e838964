// alight_core/src/error.rs

//! The error taxonomy of the control core.
//!
//! Only [`ConfigError`] is fatal, and only at startup. Everything else is
//! handled inside the tick that produced it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("time step must be positive and finite, got {0}")]
    DegenerateTiming(f64),
    #[error("expected a {expected}-dimensional quantity, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("innovation covariance is singular, measurement skipped")]
    SingularInnovation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// The estimate was requested before the mission ever entered TRACKING.
    #[error("target estimator has not been initialized")]
    EstimatorNotReady,
    #[error(transparent)]
    Estimation(#[from] EstimationError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("time step must be positive and finite, got {0}")]
    DegenerateTiming(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuidanceError {
    #[error("a path needs at least two waypoints, got {0}")]
    NotEnoughWaypoints(usize),
}
