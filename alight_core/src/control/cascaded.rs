// alight_core/src/control/cascaded.rs

use crate::config::{AxisGains, ControllerConfig};
use crate::control::pid::Pid;
use crate::error::ControlError;
use crate::types::AttitudeCommand;
use nalgebra::Vector3;

/// Three PID loops, one per body-planar axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLoops {
    pub x: Pid<f64>,
    pub y: Pid<f64>,
    pub z: Pid<f64>,
}

impl AxisLoops {
    fn from_gains(gains: &AxisGains) -> Self {
        Self {
            x: gains.x.into(),
            y: gains.y.into(),
            z: gains.z.into(),
        }
    }

    fn update(&mut self, error: &Vector3<f64>, dt: f64) -> Result<Vector3<f64>, ControlError> {
        Ok(Vector3::new(
            self.x.update_error(error.x, dt)?,
            self.y.update_error(error.y, dt)?,
            self.z.update_error(error.z, dt)?,
        ))
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}

/// # CascadedController
/// Turns a position error (and optionally a velocity error) into an
/// attitude and throttle command.
///
/// Axis outputs map to the command as follows:
/// - `roll = y` (positive y error, target to the left, rolls left)
/// - `pitch = -x` (positive x error pitches nose down)
/// - `throttle = hover_throttle + z`
///
/// Each is clamped to its configured `[min, max]`. Yaw is passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadedController {
    position: AxisLoops,
    velocity: Option<AxisLoops>,
    hover_throttle: f64,
    roll_limit: [f64; 2],
    pitch_limit: [f64; 2],
    throttle_limit: [f64; 2],
    last_command: AttitudeCommand,
}

impl CascadedController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            position: AxisLoops::from_gains(&config.position),
            velocity: config.velocity.as_ref().map(AxisLoops::from_gains),
            hover_throttle: config.hover_throttle,
            roll_limit: config.roll_limit,
            pitch_limit: config.pitch_limit,
            throttle_limit: config.throttle_limit,
            last_command: AttitudeCommand::level(0.0, config.hover_throttle),
        }
    }

    /// Drives `actual` toward `setpoint`. Both are expressed in the same
    /// yaw-aligned frame.
    pub fn calculate(
        &mut self,
        setpoint: &Vector3<f64>,
        actual: &Vector3<f64>,
        yaw: f64,
        dt: f64,
    ) -> Result<AttitudeCommand, ControlError> {
        self.calculate_errors(&(setpoint - actual), None, yaw, dt)
    }

    /// Core of the controller. `velocity_error` feeds the inner loop when one
    /// is configured and is ignored otherwise.
    ///
    /// A rejected `dt` leaves every loop untouched.
    pub fn calculate_errors(
        &mut self,
        position_error: &Vector3<f64>,
        velocity_error: Option<&Vector3<f64>>,
        yaw: f64,
        dt: f64,
    ) -> Result<AttitudeCommand, ControlError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ControlError::DegenerateTiming(dt));
        }

        let mut out = self.position.update(position_error, dt)?;
        if let (Some(loops), Some(error)) = (self.velocity.as_mut(), velocity_error) {
            out += loops.update(error, dt)?;
        }

        let command = AttitudeCommand {
            roll: clamp(out.y, self.roll_limit),
            pitch: clamp(-out.x, self.pitch_limit),
            yaw,
            throttle: clamp(self.hover_throttle + out.z, self.throttle_limit),
        };
        self.last_command = command;
        Ok(command)
    }

    /// Level attitude at hover throttle, used whenever a tick cannot be
    /// computed.
    pub fn neutral(&self, yaw: f64) -> AttitudeCommand {
        AttitudeCommand::level(yaw, self.hover_throttle)
    }

    pub fn hover_throttle(&self) -> f64 {
        self.hover_throttle
    }

    pub fn last_command(&self) -> AttitudeCommand {
        self.last_command
    }

    pub fn position_loops(&self) -> &AxisLoops {
        &self.position
    }

    pub fn velocity_loops(&self) -> Option<&AxisLoops> {
        self.velocity.as_ref()
    }

    /// Zeroes integral, previous error and output of every loop.
    pub fn reset(&mut self) {
        self.position.reset();
        if let Some(loops) = self.velocity.as_mut() {
            loops.reset();
        }
        self.last_command = AttitudeCommand::level(self.last_command.yaw, self.hover_throttle);
    }
}

fn clamp(value: f64, [low, high]: [f64; 2]) -> f64 {
    value.clamp(low, high)
}
