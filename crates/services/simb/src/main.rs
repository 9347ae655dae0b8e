//! Simulation batch orchestrator (simb)
//!
//! Sweeps branch predictors across micro-benchmarks on a cycle-level
//! simulator and tabulates the resulting statistics. simb can run in
//! different modes:
//!
//! - **Parse**: Parse and validate the configuration
//! - **Launch**: Run every benchmark and predictor of an experiment, at most N at a time
//! - **Table**: Extract statistics of a finished experiment into a table or CSV file
//!
//! Each simulation writes into `<results_root>/<tag>/<benchmark>/<predictor>`.
//! Launch records every job in `<results_root>/<tag>/jobs.jsonl` so the table
//! command can restrict statistics to each job's region of interest.

mod cli;
mod commands;
mod error;
mod prelude;

use clap::Parser;
use cli::{Cli, Commands};
use sim_config::SimConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{handle_launch, handle_parse, handle_table};
use crate::prelude::*;

/// Main entry point for simb.
///
/// # Examples
///
/// ```bash
/// # Parse configuration
/// simb --config config/sim.toml parse
///
/// # Run experiment 1 with 8 simulations at a time
/// simb launch 8 1
///
/// # Print the IPC of every job and save the full table
/// simb table 1 --stat ipc --output results/microbench_tests.csv
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simb=info,sim_jobs=info,sim_stats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::builtin(),
    };

    match cli.command {
        Commands::Parse => handle_parse(&config),
        Commands::Launch {
            parallelism,
            experiment,
        } => handle_launch(&config, parallelism, &experiment).await,
        Commands::Table {
            experiment,
            stat,
            normalize,
            output,
        } => handle_table(
            &config,
            &experiment,
            stat.as_deref(),
            normalize,
            output.as_deref(),
        ),
    }
}
