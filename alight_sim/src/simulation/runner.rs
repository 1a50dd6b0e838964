// alight_sim/src/simulation/runner.rs

use crate::simulation::config::ScenarioConfig;
use crate::simulation::detector::SimDetector;
use crate::simulation::prng::SimulationRng;
use crate::simulation::target::SimTarget;
use crate::simulation::vehicle::SimVehicle;
use alight_core::clock::{Clock, ManualClock};
use alight_core::control_loop::ControlLoop;
use alight_core::interfaces::CommandSink;
use alight_core::mission::{Mission, MissionOutput, MissionState};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A state change observed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub time: f64,
    pub state: MissionState,
}

/// The outcome of one simulated mission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimReport {
    pub name: String,
    pub final_state: MissionState,
    pub ticks: usize,
    /// Time of the disarm, if the vehicle landed.
    pub time_to_land: Option<f64>,
    /// Horizontal distance between vehicle and target at disarm (m).
    pub touchdown_error: Option<f64>,
    pub transitions: Vec<Transition>,
}

impl SimReport {
    pub fn landed(&self) -> bool {
        self.final_state == MissionState::MissionAccomplished
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} after {} ticks", self.name, self.final_state, self.ticks)?;
        if let (Some(t), Some(e)) = (self.time_to_land, self.touchdown_error) {
            write!(f, ", landed at t={t:.2}s, {e:.3} m from the target")?;
        }
        Ok(())
    }
}

/// Records every output and the state timeline.
#[derive(Debug, Default)]
struct Recorder {
    last_state: Option<MissionState>,
    transitions: Vec<Transition>,
    now: f64,
}

impl CommandSink for Recorder {
    fn send(&mut self, output: &MissionOutput) {
        if self.last_state != Some(output.state) {
            self.transitions.push(Transition {
                time: self.now,
                state: output.state,
            });
            self.last_state = Some(output.state);
        }
        debug!(
            t = self.now,
            state = %output.state,
            roll = output.command.roll,
            pitch = output.command.pitch,
            throttle = output.command.throttle,
            "tick"
        );
    }
}

/// Runs one scenario in closed loop until disarm or until the configured
/// duration elapses.
pub fn run_scenario(name: &str, config: &ScenarioConfig) -> Result<SimReport> {
    config.validate()?;

    let dt = config.simulation.dt();
    let steps = (config.simulation.duration_seconds / dt).ceil() as usize;

    let mut rng = SimulationRng::new(config.simulation.seed);
    let mut vehicle = SimVehicle::new(&config.vehicle);
    let target = SimTarget::new(&config.target);
    let detector = SimDetector::new(&config.detector)?;

    let mission = Mission::new(config.mission.clone()).context("invalid mission configuration")?;
    let mut control = ControlLoop::new(mission, ManualClock::new(0.0), dt);
    let mut recorder = Recorder::default();

    let mut report = SimReport {
        name: name.to_string(),
        final_state: MissionState::Idle,
        ticks: 0,
        time_to_land: None,
        touchdown_error: None,
        transitions: Vec::new(),
    };

    for _ in 0..steps {
        let now = control.clock().now();
        let target_position = target.position_at(now);
        let observation = detector.observe(&vehicle.pose(), &target_position, &mut rng.0);

        recorder.now = now;
        let output = control.step(&vehicle, &observation, &mut recorder);
        report.ticks += 1;
        report.final_state = output.state;

        if output.disarm {
            let miss = (vehicle.position() - target_position).xy().norm();
            info!(t = now, error = miss, "Disarmed");
            report.time_to_land = Some(now);
            report.touchdown_error = Some(miss);
            break;
        }

        vehicle.apply(&output.command, dt);
        control.clock_mut().advance(dt);
    }

    if !report.landed() {
        warn!(scenario = name, state = %report.final_state, "Scenario ended without landing");
    }
    report.transitions = recorder.transitions;
    Ok(report)
}

/// Every scenario file under `path`: the file itself, or all `*.toml`
/// files below a directory, sorted.
pub fn collect_scenarios(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry =
            entry.with_context(|| format!("failed to walk scenario directory {}", path.display()))?;
        let is_toml = entry.path().extension().is_some_and(|ext| ext == "toml");
        if entry.file_type().is_file() && is_toml {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Loads and runs every scenario under `path`.
pub fn run_batch(path: &Path) -> Result<Vec<SimReport>> {
    let files = collect_scenarios(path)?;
    anyhow::ensure!(!files.is_empty(), "no scenarios found under {}", path.display());

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let config = ScenarioConfig::load(&file)?;
        let name = config.simulation.name.clone().unwrap_or_else(|| {
            file.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string())
        });
        let report = run_scenario(&name, &config)?;
        info!("{report}");
        reports.push(report);
    }
    Ok(reports)
}
