//! Output directory layout.
//!
//! Every job writes under `<results_root>/<tag>/<benchmark>/<variant>`. The
//! launcher and the aggregator both derive paths from here so they always
//! agree on where a job's artifacts live.

use std::path::{Component, Path, PathBuf};

use crate::prelude::*;

/// Name of the per-tag job ledger.
pub const LEDGER_FILE: &str = "jobs.jsonl";

/// Statistics log the simulator writes inside a job's output directory.
pub const STATS_FILE: &str = "stats.txt";

/// First line of every dump in the statistics log.
pub const DUMP_BEGIN_MARKER: &str = "---------- Begin Simulation Statistics";

/// Last line of every complete dump in the statistics log.
pub const DUMP_END_MARKER: &str = "---------- End Simulation Statistics";

/// Captured simulator stdout/stderr inside a job's output directory.
pub const SIMOUT_FILE: &str = "simout.txt";

/// Deterministic mapping from job coordinates to filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    results_root: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at `results_root`.
    pub fn new(results_root: impl Into<PathBuf>) -> Self {
        Self {
            results_root: results_root.into(),
        }
    }

    /// Root of every experiment's results.
    pub fn results_root(&self) -> &Path {
        &self.results_root
    }

    /// Directory holding all jobs of an experiment tag.
    pub fn tag_dir(&self, tag: &str) -> PathBuf {
        self.results_root.join(tag)
    }

    /// Output directory of a single job.
    pub fn job_dir(&self, tag: &str, benchmark: &str, variant: &str) -> PathBuf {
        self.tag_dir(tag).join(benchmark).join(variant)
    }

    /// JSON-lines ledger with one record per job of `tag`.
    pub fn ledger_path(&self, tag: &str) -> PathBuf {
        self.tag_dir(tag).join(LEDGER_FILE)
    }
}

/// Check that `label` can be joined onto a path without escaping it.
///
/// A valid label is exactly one normal path component: not empty, no
/// separators, no `.` or `..`, not absolute.
pub fn validate_label(label: &str) -> Result<()> {
    let mut components = Path::new(label).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == label => Ok(()),
        _ => Err(Error::InvalidLabel(String::from(label))),
    }
}
