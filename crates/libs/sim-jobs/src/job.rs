//! Job description.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sim_config::Predictor;

/// One simulator invocation.
///
/// Created by [`crate::space::JobSpaceBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Experiment group identifier.
    pub tag: String,
    /// Simulator binary.
    pub executable_path: PathBuf,
    /// Configuration script handed to the simulator.
    pub config_script_path: PathBuf,
    /// Directory receiving every artifact of this job. Unique within a batch.
    pub output_dir: PathBuf,
    /// Benchmark under test.
    pub benchmark: String,
    /// Predictor variant under test.
    pub variant: Predictor,
    /// Workload binary the simulator executes.
    pub workload_path: PathBuf,
}

impl JobSpec {
    /// Label of the variant, as passed to the configuration script.
    pub fn variant_label(&self) -> &'static str {
        self.variant.label()
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tag, self.benchmark, self.variant)
    }
}
