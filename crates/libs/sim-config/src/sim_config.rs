//! Core configuration types for simulation batches.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::experiment::{Experiment, SimUserExperiment};
use crate::layout::OutputLayout;
use crate::predictor::Predictor;
use crate::prelude::*;

/// Grace period granted to the simulator after the end of the region of
/// interest when the configuration does not set one.
pub const DEFAULT_ROI_END_GRACE_SECS: u64 = 5;

/// Global configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimGlobalConfig {
    /// Configuration version.
    pub version: String,
}

/// User-provided simulator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimUserSimulator {
    /// Simulator binary.
    pub executable: PathBuf,
    /// Configuration script handed to the simulator as its first argument.
    pub config_script: PathBuf,
    /// Flag used to point the simulator at the job's output directory,
    /// e.g. `--outdir`. The job's working directory is always set to it.
    #[serde(default)]
    pub outdir_flag: Option<String>,
    /// Root under which every job output directory is created.
    pub results_root: PathBuf,
    /// Directory with one subdirectory per benchmark.
    pub benchmarks_dir: PathBuf,
    /// Workload file inside each benchmark directory.
    pub workload_file: String,
    /// Kill a job after this many seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Seconds to wait for the simulator to exit once the region of interest ended.
    #[serde(default)]
    pub roi_end_grace_secs: Option<u64>,
}

/// User-provided configuration from TOML files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimUserConfig {
    /// Global settings.
    pub global: SimGlobalConfig,
    /// Simulator invocation settings.
    pub simulator: SimUserSimulator,
    /// Experiment definitions.
    pub experiments: Vec<SimUserExperiment>,
}

/// Validated simulator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Simulator binary.
    pub executable: PathBuf,
    /// Configuration script.
    pub config_script: PathBuf,
    /// Optional output directory flag.
    pub outdir_flag: Option<String>,
    /// Output layout rooted at the results root.
    pub layout: OutputLayout,
    /// Benchmarks directory.
    pub benchmarks_dir: PathBuf,
    /// Workload file inside each benchmark directory.
    pub workload_file: String,
    /// Per-job timeout.
    pub timeout: Option<Duration>,
    /// Grace period after the end of the region of interest.
    pub roi_end_grace: Duration,
}

impl SimulatorConfig {
    /// Path of the workload a job on `benchmark` runs.
    pub fn workload_path(&self, benchmark: &str) -> PathBuf {
        self.benchmarks_dir.join(benchmark).join(&self.workload_file)
    }
}

/// Internal configuration, validated once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Global settings.
    pub global: SimGlobalConfig,
    /// Simulator settings.
    pub simulator: SimulatorConfig,
    /// Experiments in declaration order.
    pub experiments: Vec<Experiment>,
}

impl SimConfig {
    /// Validate a user configuration.
    pub fn from_user_config(config: SimUserConfig) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut experiments = Vec::with_capacity(config.experiments.len());
        for experiment in config.experiments {
            if !ids.insert(experiment.id.clone()) {
                return Err(Error::DuplicateExperiment(experiment.id));
            }
            experiments.push(Experiment::from_user_experiment(experiment)?);
        }

        let simulator = config.simulator;
        Ok(Self {
            global: config.global,
            simulator: SimulatorConfig {
                executable: simulator.executable,
                config_script: simulator.config_script,
                outdir_flag: simulator.outdir_flag,
                layout: OutputLayout::new(simulator.results_root),
                benchmarks_dir: simulator.benchmarks_dir,
                workload_file: simulator.workload_file,
                timeout: simulator.timeout_secs.map(Duration::from_secs),
                roi_end_grace: Duration::from_secs(
                    simulator
                        .roi_end_grace_secs
                        .unwrap_or(DEFAULT_ROI_END_GRACE_SECS),
                ),
            },
            experiments,
        })
    }

    /// Load and validate a configuration file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let config = SimUserConfig::from_file(file_path)?;
        info!("Loaded configuration {:?}", file_path);
        Self::from_user_config(config)
    }

    /// Defaults matching the stock gem5 micro-benchmark setup.
    pub fn builtin() -> Self {
        Self {
            global: SimGlobalConfig {
                version: String::from("1.0.0"),
            },
            simulator: SimulatorConfig {
                executable: PathBuf::from("build/X86/gem5.opt"),
                config_script: PathBuf::from("gem5-config/run_micro.py"),
                outdir_flag: Some(String::from("--outdir")),
                layout: OutputLayout::new("results/X86/run_micro"),
                benchmarks_dir: PathBuf::from("microbenchmark"),
                workload_file: String::from("bench.X86"),
                timeout: None,
                roi_end_grace: Duration::from_secs(DEFAULT_ROI_END_GRACE_SECS),
            },
            experiments: vec![Experiment {
                id: String::from("1"),
                tag: String::from("microbench_tests"),
                predictors: Predictor::ALL.to_vec(),
                benchmarks: None,
            }],
        }
    }

    /// Resolve an experiment selector.
    pub fn experiment(&self, selector: &str) -> Result<&Experiment> {
        self.experiments
            .iter()
            .find(|experiment| experiment.id == selector)
            .ok_or_else(|| Error::UnknownExperiment(String::from(selector)))
    }
}

impl SimUserConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML string.
    pub fn from_toml(value: &str) -> Result<Self> {
        Ok(toml::from_str(value)?)
    }
}
