// alight_sim/src/planning/mod.rs

//! Offline trajectory pre-planning for the approach leg.

pub mod ga;
pub mod trajectory;

use crate::planning::ga::{GaConfig, GaPlanner, ProblemData};
use crate::planning::trajectory::{write_records, TrajectoryRecord};
use anyhow::{ensure, Context, Result};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The root of a planner TOML file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfig {
    #[serde(default)]
    pub problem: ProblemData,
    #[serde(default)]
    pub planner: GaConfig,
}

impl PlanConfig {
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading planner configuration from: {}", path.display());
        ensure!(path.is_file(), "planner file {} does not exist", path.display());
        let config: Self = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("failed to parse planner configuration {}", path.display()))?;
        config.problem.validate()?;
        config.planner.validate()?;
        Ok(config)
    }
}

/// Runs the genetic planner and returns the best trajectory found.
pub fn plan(config: &PlanConfig) -> Result<Vec<TrajectoryRecord>> {
    let mut planner = GaPlanner::new(config.planner.clone())?;
    let best = planner.optimize(&config.problem)?;
    info!(score = best.score, steps = best.nb_steps, "Trajectory planned");
    Ok(best.to_records())
}

/// Plans and writes the records to `output`.
pub fn plan_to_file(config: &PlanConfig, output: &Path) -> Result<Vec<TrajectoryRecord>> {
    let records = plan(config)?;
    write_records(output, &records)?;
    info!("Wrote {} records to {}", records.len(), output.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_plan_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "plan.toml",
                r#"
                [problem]
                nb_steps = 8
                pos_final = [2.0, 4.0]

                [planner]
                max_generations = 5
                seed = 3
                "#,
            )?;
            let config = PlanConfig::load(Path::new("plan.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.problem.nb_steps, 8);
            assert_eq!(config.problem.pos_final, [2.0, 4.0]);
            assert_eq!(config.planner.max_generations, 5);
            assert_eq!(config.planner.seed, Some(3));
            assert_eq!(config.planner.population_size, GaConfig::default().population_size);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_degenerate_problem() {
        Jail::expect_with(|jail| {
            jail.create_file("plan.toml", "[problem]\nnb_steps = 1\n")?;
            assert!(PlanConfig::load(Path::new("plan.toml")).is_err());
            Ok(())
        });
    }
}
