// alight_sim/src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Alight: closed-loop simulation and planning for autonomous landing on a
/// moving target.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is not set, e.g. `info` or
    /// `alight_core=debug`.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run one scenario file, or every scenario below a directory.
    Run {
        #[arg(short, long, default_value = "assets/scenarios")]
        scenario: PathBuf,
    },
    /// Print a scenario with every default filled in.
    Config {
        #[arg(short, long, default_value = "assets/scenarios/static_target.toml")]
        scenario: PathBuf,
    },
    /// Pre-plan an approach trajectory with the genetic planner.
    Plan {
        #[arg(short, long, default_value = "assets/planner/ga.toml")]
        config: PathBuf,

        /// Where to write the trajectory records.
        #[arg(short, long, default_value = "trajectory.jsonl")]
        output: PathBuf,
    },
}
