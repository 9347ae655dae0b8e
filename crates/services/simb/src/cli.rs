//! Command-line interface for the simulation batch orchestrator.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for simb.
#[derive(Parser)]
#[command(name = "simb")]
#[command(about = "Run branch predictor sweeps on a simulator and tabulate the results")]
pub struct Cli {
    /// Path to the configuration file. Built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse and display the configuration
    Parse,

    /// Run every benchmark and predictor of an experiment
    Launch {
        /// Maximum number of simulations running at once
        parallelism: NonZeroUsize,

        /// Experiment selector
        experiment: String,
    },

    /// Extract statistics of a finished experiment
    Table {
        /// Experiment selector
        experiment: String,

        /// Only print this column (cycles, instructions, Ops, Ticks, Host,
        /// branchMispredicts, execBranches, condPredicted, condIncorrect,
        /// ipc, cpi, accuracy)
        #[arg(short, long)]
        stat: Option<String>,

        /// Divide the selected column by the first predictor of each benchmark
        #[arg(short, long, requires = "stat")]
        normalize: bool,

        /// Write the full table as CSV to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
