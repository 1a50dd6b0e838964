// alight_sim/src/planning/trajectory.rs

//! The trajectory record format written by the planner: one JSON object per
//! time step, one object per line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Planar state and inputs at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrajectoryRecord {
    pub time_step: usize,
    pub x: f64,
    pub vx: f64,
    pub z: f64,
    pub vz: f64,
    /// Thrust acceleration (m/s^2).
    pub az: f64,
    /// Pitch angle (rad).
    pub theta: f64,
}

pub fn encode_records(records: &[TrajectoryRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record)
            .with_context(|| format!("failed to encode time step {}", record.time_step))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Parses records back. Blank lines are skipped.
pub fn decode_records(input: &str) -> Result<Vec<TrajectoryRecord>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("bad trajectory record on line {}", i + 1))
        })
        .collect()
}

pub fn write_records(path: &Path, records: &[TrajectoryRecord]) -> Result<()> {
    fs::write(path, encode_records(records)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_records(path: &Path) -> Result<Vec<TrajectoryRecord>> {
    let input =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_records(&input)
}
