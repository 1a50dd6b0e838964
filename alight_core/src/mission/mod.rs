// alight_core/src/mission/mod.rs

//! The Mission State Machine.
//!
//! Every tick runs exactly one branch, the one for the current state. A
//! branch may pick the next state, which only takes effect on the following
//! tick. The one exception is disarm: the disarmed command goes out on the
//! very tick the belief counter fills.

pub mod heading;
pub mod landing;

use crate::config::MissionConfig;
use crate::control::cascaded::CascadedController;
use crate::error::{ConfigError, TrackerError};
use crate::frames::{body_planar_to_world, rotate_to_heading};
use crate::guidance::SetpointGenerator;
use crate::tracking::{TargetEstimate, TargetTracker};
use crate::types::{AttitudeCommand, Pose, TargetObservation, Timestamp};
use heading::TargetHeading;
use landing::LandingMonitor;
use nalgebra::Vector3;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

// =========================================================================
// == Mission Types ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MissionState {
    Idle,
    Discover,
    Tracking,
    Landing,
    Hover,
    CarrotInitialize,
    Carrot,
    MissionAccomplished,
}

impl fmt::Display for MissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Discover => "DISCOVER",
            Self::Tracking => "TRACKING",
            Self::Landing => "LANDING",
            Self::Hover => "HOVER",
            Self::CarrotInitialize => "CARROT_INITIALIZE",
            Self::Carrot => "CARROT",
            Self::MissionAccomplished => "MISSION_ACCOMPLISHED",
        };
        f.write_str(name)
    }
}

/// Everything the mission consumes in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    pub pose: Pose,
    pub observation: TargetObservation,
    /// Seconds since the previous tick.
    pub dt: f64,
    /// Monotonic time of this tick.
    pub now: Timestamp,
}

/// Everything the mission produces in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionOutput {
    /// The state after this tick.
    pub state: MissionState,
    pub command: AttitudeCommand,
    /// World-frame position the vehicle is being steered to.
    pub setpoint: Vector3<f64>,
    /// Set once, and from then on, when the vehicle should cut its motors.
    pub disarm: bool,
}

/// How the controller error is formed this tick.
enum Guidance {
    /// Fly to a world-frame point.
    World(Vector3<f64>),
    /// Drive a body-planar error to zero. `setpoint` is only for telemetry.
    Relative {
        position_error: Vector3<f64>,
        velocity_error: Option<Vector3<f64>>,
        setpoint: Vector3<f64>,
    },
    /// Hold level attitude at hover throttle.
    Neutral,
}

// =========================================================================
// == Mission ==
// =========================================================================

#[derive(Debug, Clone)]
pub struct Mission {
    config: MissionConfig,
    state: MissionState,
    pose: Pose,
    tracker: TargetTracker,
    controller: CascadedController,
    setpoints: SetpointGenerator,
    landing: LandingMonitor,
    heading: TargetHeading,
    estimator_initialized: bool,
    tracking_start: Timestamp,
    halted: bool,
}

impl Mission {
    /// Validates `config` and builds a mission in IDLE. A config that fails
    /// [`MissionConfig::validate`] never reaches the control loop.
    pub fn new(config: MissionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tracker: TargetTracker::new(config.estimator.clone(), &config.presence),
            controller: CascadedController::new(&config.controller),
            setpoints: SetpointGenerator::new(config.hover_height, &config.carrot),
            landing: LandingMonitor::new(config.landing.clone()),
            heading: TargetHeading::new(config.tracking.heading_history),
            state: MissionState::Idle,
            pose: Pose::default(),
            estimator_initialized: false,
            tracking_start: 0.0,
            halted: false,
            config,
        })
    }

    /// Runs one control cycle. Never fails: a tick that cannot be computed
    /// degrades to a level hover command.
    pub fn tick(&mut self, input: &TickInput) -> MissionOutput {
        if self.state == MissionState::MissionAccomplished {
            return self.disarmed_output();
        }

        if !input.pose.is_finite() {
            warn!(pose = ?input.pose, "Non-finite pose, holding level");
            return self.neutral_output(self.pose.yaw);
        }
        self.pose = input.pose;

        if !(input.dt.is_finite() && input.dt > 0.0) {
            warn!(dt = input.dt, "Degenerate time step, holding level");
            return self.neutral_output(self.pose.yaw);
        }

        let observation = input.observation.sanitized();
        self.tracker.observe(&observation, input.now);
        self.record_bearing(&observation);

        if self.halted {
            let hover = self.setpoints.hover_setpoint(&self.pose);
            return self.command(Guidance::World(hover), input.dt);
        }

        let guidance = match self.state {
            MissionState::Idle => self.run_idle(),
            MissionState::Discover => self.run_discover(&observation, input.now),
            MissionState::Tracking => self.run_tracking(&observation, input.now, input.dt),
            MissionState::Landing => self.run_landing(&observation, input.now, input.dt),
            MissionState::Hover => Guidance::World(self.setpoints.hover_setpoint(&self.pose)),
            MissionState::CarrotInitialize => self.run_carrot_initialize(),
            MissionState::Carrot => self.run_carrot(),
            MissionState::MissionAccomplished => Guidance::Neutral,
        };

        if self.state == MissionState::MissionAccomplished {
            return self.disarmed_output();
        }
        self.command(guidance, input.dt)
    }

    // --- Per-state branches ---

    fn run_idle(&mut self) -> Guidance {
        let hover = self.pose.position + Vector3::new(0.0, 0.0, self.config.hover_height);
        self.setpoints.hover_point_mut().set(hover);
        self.transition(MissionState::Discover);
        Guidance::World(hover)
    }

    fn run_discover(&mut self, observation: &TargetObservation, now: Timestamp) -> Guidance {
        if observation.detected {
            match self.tracker.initialize(observation.offset, now) {
                Ok(()) => {
                    self.estimator_initialized = true;
                    self.tracking_start = now;
                    self.follow_target(&observation.offset);
                    self.transition(MissionState::Tracking);
                }
                Err(e) => warn!(error = %e, "Failed to initialize target estimator"),
            }
        }
        Guidance::World(self.setpoints.hover_setpoint(&self.pose))
    }

    fn run_tracking(&mut self, observation: &TargetObservation, now: Timestamp, dt: f64) -> Guidance {
        if self.target_lost_too_long(now) {
            return self.fall_back_to_discover();
        }

        let elapsed = now - self.tracking_start;
        if elapsed >= self.config.tracking.min_track_time
            && observation.detected
            && self.landing.is_aligned(&observation.offset)
        {
            self.landing.start(now);
            self.transition(MissionState::Landing);
        }

        self.track_target(observation, now, dt)
    }

    fn run_landing(&mut self, observation: &TargetObservation, now: Timestamp, dt: f64) -> Guidance {
        if self.target_lost_too_long(now) {
            return self.fall_back_to_discover();
        }

        let guidance = self.track_target(observation, now, dt);

        let height = self.setpoints.hover_point().height();
        if let Some(adjustment) =
            self.landing
                .update_height(height, observation.detected, &observation.offset, now)
        {
            self.setpoints.hover_point_mut().set_height(adjustment.height());
        }

        let estimated = match self.target_estimate() {
            Ok(estimate) => estimate.position,
            // Nothing to compare against; the raw detection alone decides.
            Err(_) => Vector3::repeat(f64::INFINITY),
        };
        let measured = observation.detected.then_some(&observation.offset);
        let in_zone = self.landing.within_landing_zone(measured, &estimated);

        if self.landing.update_belief(in_zone) {
            info!(belief = self.landing.belief(), "Disarming");
            self.transition(MissionState::MissionAccomplished);
        } else if in_zone {
            debug!(belief = self.landing.belief(), "Inside landing zone");
        }

        guidance
    }

    fn run_carrot_initialize(&mut self) -> Guidance {
        if let Err(e) = self.setpoints.initialize_carrot(&self.pose) {
            warn!(error = %e, "Carrot path rejected, hovering instead");
            self.transition(MissionState::Hover);
        } else {
            self.transition(MissionState::Carrot);
        }
        Guidance::World(self.setpoints.hover_setpoint(&self.pose))
    }

    fn run_carrot(&mut self) -> Guidance {
        let setpoint = self.setpoints.carrot_setpoint(&self.pose);
        if setpoint.path_finished {
            self.transition(MissionState::Hover);
        }
        Guidance::World(setpoint.position)
    }

    // --- Target pursuit ---

    /// Advances the estimator and builds the relative error toward the
    /// target. While the target is lost the horizontal error is zero.
    fn track_target(&mut self, observation: &TargetObservation, now: Timestamp, dt: f64) -> Guidance {
        if let Err(e) = self.tracker.estimate(observation, dt) {
            warn!(error = %e, "Target estimate step skipped");
        }

        if observation.detected {
            self.follow_target(&observation.offset);
        }

        let hover_z = self.setpoints.hover_point().height();
        let z_error = hover_z - self.pose.position.z;

        let estimate = match self.target_estimate() {
            Ok(estimate) if !self.tracker.is_lost(now) => estimate,
            Ok(_) => {
                debug!("Target lost, holding position");
                return self.hold_relative(z_error, hover_z);
            }
            Err(e) => {
                warn!(error = %e, "No target estimate, holding position");
                return self.hold_relative(z_error, hover_z);
            }
        };

        let offset = self.config.tracking.position_offset;
        let position_error = Vector3::new(
            estimate.position.x - offset[0],
            estimate.position.y - offset[1],
            z_error,
        );
        let velocity_error = Some(Vector3::new(estimate.velocity.x, estimate.velocity.y, 0.0));

        let target_world = self.pose.position + body_planar_to_world(&estimate.position, self.pose.yaw);
        Guidance::Relative {
            position_error,
            velocity_error,
            setpoint: Vector3::new(target_world.x, target_world.y, hover_z),
        }
    }

    fn hold_relative(&self, z_error: f64, hover_z: f64) -> Guidance {
        Guidance::Relative {
            position_error: Vector3::new(0.0, 0.0, z_error),
            velocity_error: None,
            setpoint: Vector3::new(self.pose.position.x, self.pose.position.y, hover_z),
        }
    }

    /// Moves the hover point horizontally over the observed target.
    fn follow_target(&mut self, offset: &Vector3<f64>) {
        let target = self.pose.position + body_planar_to_world(offset, self.pose.yaw);
        self.setpoints.hover_point_mut().set_xy(target.x, target.y);
    }

    fn target_lost_too_long(&self, now: Timestamp) -> bool {
        let Some(limit) = self.config.tracking.target_lost_limit else {
            return false;
        };
        self.tracker.is_lost(now)
            && self
                .tracker
                .presence()
                .time_since_seen(now)
                .map_or(true, |unseen| unseen > limit)
    }

    /// Keeps the bearing history of every usable detection made while
    /// pursuing the target.
    fn record_bearing(&mut self, observation: &TargetObservation) {
        let pursuing = matches!(
            self.state,
            MissionState::Discover | MissionState::Tracking | MissionState::Landing
        );
        if !(pursuing && observation.detected) {
            return;
        }
        let displacement = body_planar_to_world(&observation.offset, self.pose.yaw).xy();
        if displacement.norm() >= self.config.tracking.heading_min_distance {
            self.heading.record(displacement);
        }
    }

    /// Yaw to command this tick: facing the target when heading alignment is
    /// on and a bearing is known, the current heading otherwise.
    fn command_yaw(&self) -> f64 {
        let pursuing = matches!(
            self.state,
            MissionState::Discover | MissionState::Tracking | MissionState::Landing
        );
        if self.config.tracking.align_heading && pursuing && !self.halted {
            self.heading.yaw().unwrap_or(self.pose.yaw)
        } else {
            self.pose.yaw
        }
    }

    fn fall_back_to_discover(&mut self) -> Guidance {
        warn!("Target lost for too long, searching again");
        self.transition(MissionState::Discover);
        Guidance::World(self.setpoints.hover_setpoint(&self.pose))
    }

    // --- Output ---

    fn command(&mut self, guidance: Guidance, dt: f64) -> MissionOutput {
        // Errors are expressed in the current heading; only the commanded
        // yaw turns toward the target.
        let heading = self.pose.yaw;
        let yaw = self.command_yaw();
        let (result, setpoint) = match guidance {
            Guidance::World(setpoint) => {
                let error = rotate_to_heading(&(setpoint - self.pose.position), heading);
                (self.controller.calculate_errors(&error, None, yaw, dt), setpoint)
            }
            Guidance::Relative {
                position_error,
                velocity_error,
                setpoint,
            } => (
                self.controller
                    .calculate_errors(&position_error, velocity_error.as_ref(), yaw, dt),
                setpoint,
            ),
            Guidance::Neutral => return self.neutral_output(heading),
        };

        match result {
            Ok(command) => MissionOutput {
                state: self.state,
                command,
                setpoint,
                disarm: false,
            },
            Err(e) => {
                warn!(error = %e, "Controller step rejected, holding level");
                self.neutral_output(heading)
            }
        }
    }

    fn neutral_output(&self, yaw: f64) -> MissionOutput {
        let setpoint = if self.setpoints.hover_point().initialized {
            self.setpoints.hover_point().position
        } else {
            self.pose.position
        };
        MissionOutput {
            state: self.state,
            command: self.controller.neutral(yaw),
            setpoint,
            disarm: false,
        }
    }

    fn disarmed_output(&self) -> MissionOutput {
        MissionOutput {
            state: MissionState::MissionAccomplished,
            command: AttitudeCommand::level(self.pose.yaw, 0.0),
            setpoint: self.pose.position,
            disarm: true,
        }
    }

    fn transition(&mut self, next: MissionState) {
        if next == self.state {
            return;
        }
        info!(from = %self.state, to = %next, "Mission state transition");

        let leaving_hover = self.state == MissionState::Hover;
        let lost_fallback = next == MissionState::Discover
            && matches!(self.state, MissionState::Tracking | MissionState::Landing);
        if leaving_hover || next == MissionState::Tracking || lost_fallback {
            self.controller.reset();
        }
        if lost_fallback {
            self.landing.reset();
        }
        self.state = next;
    }

    // --- External requests ---

    /// Starts the rectangular search loop on the next tick. Only honored
    /// from IDLE, DISCOVER and HOVER.
    pub fn request_waypoint_following(&mut self) -> bool {
        if matches!(
            self.state,
            MissionState::Idle | MissionState::Discover | MissionState::Hover
        ) {
            self.transition(MissionState::CarrotInitialize);
            true
        } else {
            false
        }
    }

    /// Switches to holding the hover point. Not honored while pursuing the
    /// target or after the mission is accomplished.
    pub fn request_hover(&mut self) -> bool {
        if matches!(
            self.state,
            MissionState::Tracking | MissionState::Landing | MissionState::MissionAccomplished
        ) {
            return false;
        }
        self.transition(MissionState::Hover);
        true
    }

    /// Freezes the mission in place. Until [`Mission::resume`], every tick
    /// holds the current position, no transitions happen and disarm is
    /// never evaluated.
    pub fn halt(&mut self) {
        if self.halted {
            return;
        }
        info!(position = ?self.pose.position, "Mission halted, hovering in place");
        self.halted = true;
        self.setpoints.hover_point_mut().set(self.pose.position);
        self.controller.reset();
    }

    pub fn resume(&mut self) {
        if self.halted {
            info!("Mission resumed");
            self.halted = false;
            self.controller.reset();
        }
    }

    /// Back to IDLE with every piece of state cleared.
    pub fn reset(&mut self) {
        info!(from = %self.state, "Mission reset");
        self.state = MissionState::Idle;
        self.tracker.reset();
        self.controller.reset();
        self.setpoints.reset();
        self.landing.reset();
        self.heading.clear();
        self.estimator_initialized = false;
        self.tracking_start = 0.0;
        self.halted = false;
    }

    /// The output for a tick with no usable input: level at hover throttle,
    /// or still disarmed once the mission is accomplished.
    pub fn hold_level(&self) -> MissionOutput {
        if self.state == MissionState::MissionAccomplished {
            self.disarmed_output()
        } else {
            self.neutral_output(self.pose.yaw)
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn estimator_initialized(&self) -> bool {
        self.estimator_initialized
    }

    pub fn tracking_start(&self) -> Timestamp {
        self.tracking_start
    }

    /// The filtered target state. Guarded on the estimator having been
    /// initialized by a DISCOVER to TRACKING transition.
    pub fn target_estimate(&self) -> Result<TargetEstimate, TrackerError> {
        if !self.estimator_initialized {
            return Err(TrackerError::EstimatorNotReady);
        }
        self.tracker.estimate_state()
    }

    pub fn tracker(&self) -> &TargetTracker {
        &self.tracker
    }

    pub fn controller(&self) -> &CascadedController {
        &self.controller
    }

    pub fn setpoints(&self) -> &SetpointGenerator {
        &self.setpoints
    }

    pub fn landing(&self) -> &LandingMonitor {
        &self.landing
    }

    pub fn heading(&self) -> &TargetHeading {
        &self.heading
    }

    pub fn hover_point(&self) -> Vector3<f64> {
        self.setpoints.hover_point().position
    }
}
