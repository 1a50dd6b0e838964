// alight_sim/src/prelude.rs

// Re-export the entire alight_core prelude so binaries and tests can reach
// the mission types directly.
pub use alight_core::prelude::*;

pub use crate::planning::ga::{GaConfig, GaPlanner, Individual, ProblemData};
pub use crate::planning::trajectory::TrajectoryRecord;
pub use crate::planning::PlanConfig;
pub use crate::simulation::config::ScenarioConfig;
pub use crate::simulation::runner::{run_batch, run_scenario, SimReport};
