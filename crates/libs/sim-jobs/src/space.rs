//! Job space generation.
//!
//! A job space is the Cartesian product of benchmarks and predictor variants.
//! Jobs are emitted benchmark-major: every variant of the first benchmark,
//! then every variant of the second one, and so on.

use std::collections::HashSet;

use sim_config::layout::validate_label;
use sim_config::{Experiment, Predictor, SimConfig, SimulatorConfig};
use tracing::{info, warn};

use crate::job::JobSpec;
use crate::prelude::*;

/// Enumerates the jobs of one experiment tag.
#[derive(Debug, Clone)]
pub struct JobSpaceBuilder<'a> {
    tag: &'a str,
    simulator: &'a SimulatorConfig,
}

impl<'a> JobSpaceBuilder<'a> {
    /// Create a builder for `tag` using `simulator` settings.
    pub fn new(tag: &'a str, simulator: &'a SimulatorConfig) -> Self {
        Self { tag, simulator }
    }

    /// Create a builder for a configured experiment.
    pub fn from_experiment(config: &'a SimConfig, experiment: &'a Experiment) -> Self {
        Self::new(&experiment.tag, &config.simulator)
    }

    /// Produce one job per `(benchmark, variant)` pair.
    ///
    /// Output directories are derived from `(tag, benchmark, variant)` only, so
    /// identical inputs always yield identical paths. Fails before emitting
    /// anything when a label is not usable as a directory name or when two
    /// jobs would share an output directory. Workloads are not required to
    /// exist yet; a missing one makes that job fail when it runs.
    pub fn build(&self, benchmarks: &[String], variants: &[Predictor]) -> Result<Vec<JobSpec>> {
        validate_label(self.tag)?;
        let layout = &self.simulator.layout;

        let mut jobs = Vec::with_capacity(benchmarks.len() * variants.len());
        let mut output_dirs = HashSet::with_capacity(jobs.capacity());
        for benchmark in benchmarks {
            validate_label(benchmark)?;
            let workload_path = self.simulator.workload_path(benchmark);
            if !workload_path.exists() {
                warn!("{} - Workload {:?} not found", benchmark, workload_path);
            }

            for variant in variants {
                let output_dir = layout.job_dir(self.tag, benchmark, variant.label());
                if !output_dirs.insert(output_dir.clone()) {
                    return Err(Error::DuplicateOutputDir(output_dir));
                }
                jobs.push(JobSpec {
                    tag: String::from(self.tag),
                    executable_path: self.simulator.executable.clone(),
                    config_script_path: self.simulator.config_script.clone(),
                    output_dir,
                    benchmark: benchmark.clone(),
                    variant: *variant,
                    workload_path: workload_path.clone(),
                });
            }
        }

        info!(
            "{} - {} jobs ({} benchmarks x {} variants)",
            self.tag,
            jobs.len(),
            benchmarks.len(),
            variants.len()
        );
        Ok(jobs)
    }
}
