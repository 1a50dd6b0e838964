// alight_core/src/config.rs

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # MissionConfig
/// Every tunable of the mission: gains, limits, thresholds and periods.
/// This struct is the `[mission]` section of a scenario file. It is parsed
/// and validated once, before the control loop starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissionConfig {
    /// Altitude added to the current pose when a hover point is first set (m).
    #[serde(default = "default_hover_height")]
    pub hover_height: f64,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub landing: LandingConfig,

    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub carrot: CarrotConfig,

    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub presence: PresenceConfig,
}

fn default_hover_height() -> f64 {
    5.0
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            hover_height: default_hover_height(),
            tracking: TrackingConfig::default(),
            landing: LandingConfig::default(),
            controller: ControllerConfig::default(),
            carrot: CarrotConfig::default(),
            estimator: EstimatorConfig::default(),
            presence: PresenceConfig::default(),
        }
    }
}

impl MissionConfig {
    /// Checks every field for values the mission cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("hover_height", self.hover_height)?;
        self.tracking.validate()?;
        self.landing.validate()?;
        self.controller.validate()?;
        self.carrot.validate()?;
        self.estimator.validate()?;
        self.presence.validate()
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrackingConfig {
    /// Seconds the target must be tracked before a landing may begin.
    pub min_track_time: f64,
    /// Seconds the target may stay lost before the mission falls back to
    /// discovery. `None` keeps tracking indefinitely.
    pub target_lost_limit: Option<f64>,
    /// Desired body-planar offset of the target while tracking (m).
    pub position_offset: [f64; 3],
    /// Turn the vehicle to face the target while discovering, tracking and
    /// landing. Off keeps the current heading.
    pub align_heading: bool,
    /// Number of target bearings averaged into the heading.
    pub heading_history: usize,
    /// Detections closer than this horizontally (m) carry no usable bearing
    /// and are not recorded.
    pub heading_min_distance: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_track_time: 10.0,
            target_lost_limit: None,
            position_offset: [0.0; 3],
            align_heading: false,
            heading_history: 10,
            heading_min_distance: 1.0,
        }
    }
}

impl TrackingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("tracking.min_track_time", self.min_track_time)?;
        if let Some(limit) = self.target_lost_limit {
            positive("tracking.target_lost_limit", limit)?;
        }
        finite_all("tracking.position_offset", &self.position_offset)?;
        if self.heading_history == 0 {
            return Err(ConfigError::invalid(
                "tracking.heading_history",
                "must be at least 1",
            ));
        }
        non_negative("tracking.heading_min_distance", self.heading_min_distance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LandingConfig {
    /// Seconds between two hover-height adjustments.
    pub period: f64,
    /// Applied to the hover height when aligned. Must be in (0, 1).
    pub descend_multiplier: f64,
    /// Applied to the hover height when misaligned. Must exceed 1.
    pub recover_multiplier: f64,
    /// Horizontal (x, y) alignment threshold in meters.
    pub threshold: [f64; 2],
    /// Disarm cutoff (x, y, z) in meters.
    pub cutoff: [f64; 3],
    /// Number of ticks within the cutoff needed to disarm.
    pub belief_threshold: u32,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            period: 1.0,
            descend_multiplier: 0.8,
            recover_multiplier: 1.2,
            threshold: [0.5, 0.5],
            cutoff: [0.5, 0.5, 0.2],
            belief_threshold: 3,
        }
    }
}

impl LandingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("landing.period", self.period)?;
        if !(self.descend_multiplier > 0.0 && self.descend_multiplier < 1.0) {
            return Err(ConfigError::invalid(
                "landing.descend_multiplier",
                format!("must be in (0, 1), got {}", self.descend_multiplier),
            ));
        }
        if !(self.recover_multiplier > 1.0 && self.recover_multiplier.is_finite()) {
            return Err(ConfigError::invalid(
                "landing.recover_multiplier",
                format!("must be greater than 1, got {}", self.recover_multiplier),
            ));
        }
        for value in self.threshold {
            positive("landing.threshold", value)?;
        }
        for value in self.cutoff {
            positive("landing.cutoff", value)?;
        }
        if self.belief_threshold == 0 {
            return Err(ConfigError::invalid(
                "landing.belief_threshold",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Gains of a single PID loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidGains {
    pub k_p: f64,
    #[serde(default)]
    pub k_i: f64,
    #[serde(default)]
    pub k_d: f64,
}

impl PidGains {
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        finite_all(field, &[self.k_p, self.k_i, self.k_d])
    }
}

/// One set of gains per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisGains {
    pub x: PidGains,
    pub y: PidGains,
    pub z: PidGains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ControllerConfig {
    pub position: AxisGains,
    /// Optional inner velocity loop. Absent disables it.
    pub velocity: Option<AxisGains>,
    /// Throttle that holds altitude with zero vertical error.
    pub hover_throttle: f64,
    /// [min, max] roll in radians.
    pub roll_limit: [f64; 2],
    /// [min, max] pitch in radians.
    pub pitch_limit: [f64; 2],
    /// [min, max] normalized throttle.
    pub throttle_limit: [f64; 2],
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            position: AxisGains {
                x: PidGains::new(0.1, 0.0, 0.16),
                y: PidGains::new(0.1, 0.0, 0.16),
                z: PidGains::new(0.1, 0.0, 0.1),
            },
            velocity: None,
            hover_throttle: 0.5,
            roll_limit: [-0.35, 0.35],
            pitch_limit: [-0.35, 0.35],
            throttle_limit: [0.0, 1.0],
        }
    }
}

impl ControllerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.position.x.validate("controller.position.x")?;
        self.position.y.validate("controller.position.y")?;
        self.position.z.validate("controller.position.z")?;
        if let Some(velocity) = &self.velocity {
            velocity.x.validate("controller.velocity.x")?;
            velocity.y.validate("controller.velocity.y")?;
            velocity.z.validate("controller.velocity.z")?;
        }
        ordered("controller.roll_limit", self.roll_limit)?;
        ordered("controller.pitch_limit", self.pitch_limit)?;
        ordered("controller.throttle_limit", self.throttle_limit)?;

        let [low, high] = self.throttle_limit;
        if !(self.hover_throttle >= low && self.hover_throttle <= high) {
            return Err(ConfigError::invalid(
                "controller.hover_throttle",
                format!(
                    "{} lies outside the throttle limit [{low}, {high}]",
                    self.hover_throttle
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CarrotConfig {
    /// Distance of the carrot ahead of the closest point on the path (m).
    pub look_ahead_dist: f64,
    /// Distance to a waypoint at which it counts as reached (m).
    pub wp_threshold: f64,
    /// Side length of the rectangular search loop (m).
    pub loop_size: f64,
}

impl Default for CarrotConfig {
    fn default() -> Self {
        Self {
            look_ahead_dist: 1.0,
            wp_threshold: 0.5,
            loop_size: 5.0,
        }
    }
}

impl CarrotConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("carrot.look_ahead_dist", self.look_ahead_dist)?;
        positive("carrot.wp_threshold", self.wp_threshold)?;
        positive("carrot.loop_size", self.loop_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EstimatorConfig {
    /// Diagonal of the initial state covariance.
    pub initial_covariance: f64,
    /// Spectral density of the jerk noise in the constant-acceleration model.
    pub process_noise: f64,
    /// Standard deviation of the detector offset on each axis (m).
    pub measurement_noise: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            initial_covariance: 1.0,
            process_noise: 0.5,
            measurement_noise: 0.1,
        }
    }
}

impl EstimatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("estimator.initial_covariance", self.initial_covariance)?;
        positive("estimator.process_noise", self.process_noise)?;
        positive("estimator.measurement_noise", self.measurement_noise)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PresenceConfig {
    /// Milliseconds without a detection after which the target is lost.
    pub lost_threshold_ms: f64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            lost_threshold_ms: 1000.0,
        }
    }
}

impl PresenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("presence.lost_threshold_ms", self.lost_threshold_ms)
    }
}

// --- Field checks ---

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be positive, got {value}"),
        ))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must not be negative, got {value}"),
        ))
    }
}

fn finite_all(field: &'static str, values: &[f64]) -> Result<(), ConfigError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be finite"))
    }
}

fn ordered(field: &'static str, [low, high]: [f64; 2]) -> Result<(), ConfigError> {
    finite_all(field, &[low, high])?;
    if low > high {
        return Err(ConfigError::invalid(
            field,
            format!("min {low} exceeds max {high}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(MissionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_descend_multiplier_must_shrink() {
        let mut config = MissionConfig::default();
        config.landing.descend_multiplier = 1.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "landing.descend_multiplier",
                ..
            }
        ));
    }

    #[test]
    fn test_hover_throttle_inside_limits() {
        let mut config = MissionConfig::default();
        config.controller.throttle_limit = [0.0, 0.4];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_belief_threshold_rejected() {
        let mut config = MissionConfig::default();
        config.landing.belief_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let mut config = MissionConfig::default();
        config.controller.roll_limit = [0.3, -0.3];
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for `controller.roll_limit`: min 0.3 exceeds max -0.3"
        );
    }

    #[test]
    fn test_empty_heading_history_rejected() {
        let mut config = MissionConfig::default();
        config.tracking.heading_history = 0;
        assert!(config.validate().is_err());
    }
}
