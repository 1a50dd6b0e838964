// alight_sim/src/simulation/config.rs

//! Loading and validating scenario files.

use crate::simulation::integrators::IntegratorKind;
use alight_core::config::MissionConfig;
use anyhow::{ensure, Context, Result};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file: the simulated
/// world plus the mission configuration under test.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub vehicle: VehicleConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub mission: MissionConfig,
}

impl ScenarioConfig {
    /// Reads a scenario file and validates it. Any failure here is fatal for
    /// the run.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading scenario from: {}", path.display());
        ensure!(path.is_file(), "scenario file {} does not exist", path.display());
        let config: Self = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid scenario {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.vehicle.validate()?;
        self.target.validate()?;
        self.detector.validate()?;
        self.mission.validate()?;
        Ok(())
    }

    /// The resolved configuration, defaults filled in, as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render scenario as TOML")
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in a scenario.toml file.
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Simulation {
    /// Name shown in reports. Defaults to the file stem.
    pub name: Option<String>,
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Duration of the simulation in seconds.
    pub duration_seconds: f64,
    /// Control loop rate in Hz.
    pub rate_hz: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            name: None,
            seed: None,
            duration_seconds: 120.0,
            rate_hz: 20.0,
        }
    }
}

impl Simulation {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.duration_seconds.is_finite() && self.duration_seconds > 0.0,
            "simulation.duration_seconds must be positive"
        );
        ensure!(
            self.rate_hz.is_finite() && self.rate_hz > 0.0,
            "simulation.rate_hz must be positive"
        );
        Ok(())
    }

    pub fn dt(&self) -> f64 {
        1.0 / self.rate_hz
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct VehicleConfig {
    /// Initial world position (m).
    pub start: [f64; 3],
    /// Initial heading (rad).
    pub yaw: f64,
    /// Throttle that exactly cancels gravity.
    pub hover_throttle: f64,
    /// Linear drag coefficient (1/s).
    pub drag: f64,
    /// Gravitational acceleration (m/s^2).
    pub gravity: f64,
    /// `"rk4"` or `"rk1"` (forward Euler).
    pub integrator: IntegratorKind,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            start: [0.0, 0.0, 0.0],
            yaw: 0.0,
            hover_throttle: 0.5,
            drag: 0.1,
            gravity: 9.81,
            integrator: IntegratorKind::Rk4,
        }
    }
}

impl VehicleConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.hover_throttle > 0.0 && self.hover_throttle <= 1.0,
            "vehicle.hover_throttle must be in (0, 1]"
        );
        ensure!(self.drag >= 0.0, "vehicle.drag must not be negative");
        ensure!(self.gravity > 0.0, "vehicle.gravity must be positive");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TargetConfig {
    /// Initial world position (m). z is the ground level of the pad.
    pub start: [f64; 3],
    /// Constant horizontal drift (m/s).
    pub velocity: [f64; 2],
    /// Radius of an optional circular motion superimposed on the drift (m).
    pub circle_radius: Option<f64>,
    /// Angular rate of the circular motion (rad/s).
    pub angular_rate: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            start: [2.0, 1.0, 0.0],
            velocity: [0.0, 0.0],
            circle_radius: None,
            angular_rate: 0.1,
        }
    }
}

impl TargetConfig {
    fn validate(&self) -> Result<()> {
        if let Some(radius) = self.circle_radius {
            ensure!(radius > 0.0, "target.circle_radius must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DetectorConfig {
    /// Half field of view of the downward camera (rad).
    pub half_fov: f64,
    /// Footprint radius the camera always covers, even at touchdown (m).
    pub min_footprint: f64,
    /// Standard deviation of the offset noise on each axis (m).
    pub noise_std: f64,
    /// Probability of missing a target that is in view.
    pub dropout_probability: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            half_fov: 1.0,
            min_footprint: 0.5,
            noise_std: 0.02,
            dropout_probability: 0.05,
        }
    }
}

impl DetectorConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.half_fov > 0.0 && self.half_fov < std::f64::consts::FRAC_PI_2,
            "detector.half_fov must be in (0, pi/2)"
        );
        ensure!(self.min_footprint >= 0.0, "detector.min_footprint must not be negative");
        ensure!(self.noise_std >= 0.0, "detector.noise_std must not be negative");
        ensure!(
            (0.0..=1.0).contains(&self.dropout_probability),
            "detector.dropout_probability must be in [0, 1]"
        );
        Ok(())
    }
}
