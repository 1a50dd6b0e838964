// alight_sim/src/main.rs

use alight_sim::cli::{Cli, Command};
use alight_sim::planning::{self, PlanConfig};
use alight_sim::simulation::config::ScenarioConfig;
use alight_sim::simulation::runner::run_batch;
use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the command-line level.
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Run { scenario } => {
            let reports = run_batch(&scenario)?;
            for report in &reports {
                println!("{report}");
            }
            let failed = reports.iter().filter(|r| !r.landed()).count();
            if failed > 0 {
                bail!("{failed} of {} scenarios did not land", reports.len());
            }
        }
        Command::Config { scenario } => {
            let config = ScenarioConfig::load(&scenario)?;
            print!("{}", config.to_toml()?);
        }
        Command::Plan { config, output } => {
            let config = PlanConfig::load(&config)?;
            let records = planning::plan_to_file(&config, &output)?;
            info!(steps = records.len(), "Planning finished");
        }
    }

    Ok(())
}
