// alight_core/src/tracking/mod.rs

//! The Target Tracker: presence/loss status plus a filtered estimate of the
//! target's relative position, velocity and acceleration.
//!
//! The two layers are intentionally separate. The estimator coasts through
//! short occlusions while the presence layer decides, for the mission, when
//! the target is gone.

pub mod presence;

use crate::config::{EstimatorConfig, PresenceConfig};
use crate::error::TrackerError;
use crate::estimation::filters::kf::KalmanFilter;
use crate::estimation::{EstimatorInput, StateEstimator};
use crate::frames::{FrameAwareState, FrameId, StateVariable};
use crate::models::dynamics::constant_acceleration::ConstantAccelerationModel;
use crate::models::dynamics::Dynamics;
use crate::models::measurement::relative_position::RelativePositionModel;
use crate::types::{TargetObservation, Timestamp};
use nalgebra::{DMatrix, DVector, Vector3};
use presence::TargetPresence;

/// A read-only copy of the filtered target state, in the body-planar frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEstimate {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
    pub covariance: DMatrix<f64>,
}

/// What the presence layer reports: zeros once the target is lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportedTarget {
    pub detected: bool,
    pub lost: bool,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

#[derive(Debug, Clone)]
pub struct TargetTracker {
    presence: TargetPresence,
    filter: Option<KalmanFilter>,
    config: EstimatorConfig,
}

impl TargetTracker {
    pub fn new(estimator: EstimatorConfig, presence: &PresenceConfig) -> Self {
        Self {
            presence: TargetPresence::new(presence.lost_threshold_ms),
            filter: None,
            config: estimator,
        }
    }

    /// Feeds the presence layer. Call once per tick, before reading anything.
    pub fn observe(&mut self, observation: &TargetObservation, now: Timestamp) {
        self.presence.observe(observation, now);
    }

    pub fn is_lost(&self, now: Timestamp) -> bool {
        self.presence.is_lost(now)
    }

    pub fn presence(&self) -> &TargetPresence {
        &self.presence
    }

    /// Seeds the estimator at `offset` with zero velocity and acceleration.
    /// Replaces any previous estimate.
    pub fn initialize(&mut self, offset: Vector3<f64>, now: Timestamp) -> Result<(), TrackerError> {
        let dynamics = ConstantAccelerationModel::new(self.config.process_noise);
        let mut state =
            FrameAwareState::new(dynamics.get_state_layout(), self.config.initial_covariance, now);
        state.vector.fixed_rows_mut::<3>(0).copy_from(&offset);

        let filter = KalmanFilter::new(
            state,
            Box::new(dynamics),
            Box::new(RelativePositionModel::isotropic(self.config.measurement_noise)),
        )?;
        self.filter = Some(filter);
        Ok(())
    }

    /// Advances the estimate by `dt`. The predict step always runs, the
    /// measurement update only when the observation is a detection.
    pub fn estimate(&mut self, observation: &TargetObservation, dt: f64) -> Result<(), TrackerError> {
        let filter = self.filter.as_mut().ok_or(TrackerError::EstimatorNotReady)?;

        if observation.detected {
            let z = DVector::from_column_slice(observation.offset.as_slice());
            filter.process(&EstimatorInput::Measurement { z: &z, dt })?;
        } else {
            filter.process(&EstimatorInput::TimeStep { dt })?;
        }
        Ok(())
    }

    /// The current filtered estimate, including coasted predictions.
    pub fn estimate_state(&self) -> Result<TargetEstimate, TrackerError> {
        let filter = self.filter.as_ref().ok_or(TrackerError::EstimatorNotReady)?;
        let state = filter.get_state();
        let frame = FrameId::BodyPlanar;

        let read = |var: StateVariable| {
            state.get_vector3(&var).ok_or(TrackerError::EstimatorNotReady)
        };

        Ok(TargetEstimate {
            position: read(StateVariable::Px(frame.clone()))?,
            velocity: read(StateVariable::Vx(frame.clone()))?,
            acceleration: read(StateVariable::Ax(frame))?,
            covariance: state.covariance.clone(),
        })
    }

    /// The presence-layer view of the target at `now`.
    pub fn reported(&self, now: Timestamp) -> ReportedTarget {
        let lost = self.presence.is_lost(now);
        ReportedTarget {
            detected: self.presence.is_detected() && !lost,
            lost,
            position: self.presence.position(now),
            velocity: self.presence.velocity(now),
        }
    }

    /// Drops the estimate and all presence history.
    pub fn reset(&mut self) {
        self.presence.reset();
        self.filter = None;
    }
}
