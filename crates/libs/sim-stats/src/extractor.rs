//! Per-job statistics extraction.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sim_config::Predictor;

use crate::log::StatsLog;

/// Stats extracted from one job's output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    /// Benchmark of the job.
    pub benchmark: String,
    /// Predictor of the job.
    pub predictor: Predictor,
    /// Every requested stat, `0.0` when unavailable.
    pub values: BTreeMap<String, f64>,
}

impl StatRecord {
    /// Value of `name`, `0.0` when it was not requested.
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }
}

/// Reads named stats out of job output directories.
///
/// Extraction never fails: missing logs and malformed values resolve to `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsExtractor;

impl StatsExtractor {
    /// Value of `name` in the first dump of the statistics log of `output_dir`.
    pub fn extract(output_dir: &Path, name: &str) -> f64 {
        StatsLog::load(output_dir, 0)
            .map(|log| log.lookup(name))
            .unwrap_or(0.0)
    }

    /// Values of every name in `names`, reading dump number `dump` once.
    pub fn extract_record<'a>(
        benchmark: &str,
        predictor: Predictor,
        output_dir: &Path,
        dump: usize,
        names: impl IntoIterator<Item = &'a str>,
    ) -> StatRecord {
        let log = StatsLog::load(output_dir, dump).unwrap_or_default();
        StatRecord {
            benchmark: String::from(benchmark),
            predictor,
            values: names
                .into_iter()
                .map(|name| (String::from(name), log.lookup(name)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sim_config::layout::STATS_FILE;

    use super::*;

    #[test]
    fn missing_log_yields_zero() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(StatsExtractor::extract(dir.path(), "sim_insts"), 0.0);

        let record = StatsExtractor::extract_record(
            "CCa",
            Predictor::Local,
            &dir.path().join("missing"),
            0,
            ["sim_insts", "sim_ops"],
        );
        assert_eq!(record.values.len(), 2);
        assert!(record.values.values().all(|value| *value == 0.0));
        Ok(())
    }

    #[test]
    fn gem5_style_line() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(STATS_FILE),
            "system.cpu.numCycles     123456                       # comment\n",
        )?;
        assert_eq!(
            StatsExtractor::extract(dir.path(), "system.cpu.numCycles"),
            123456.0
        );
        Ok(())
    }

    #[test]
    fn record_reads_every_name() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(STATS_FILE),
            "sim_insts 100 # insts\nsystem.cpu.numCycles 50 # cycles\n",
        )?;

        let record = StatsExtractor::extract_record(
            "CCl",
            Predictor::Ltage,
            dir.path(),
            0,
            ["sim_insts", "system.cpu.numCycles", "sim_ops"],
        );
        assert_eq!(record.benchmark, "CCl");
        assert_eq!(record.get("sim_insts"), 100.0);
        assert_eq!(record.get("system.cpu.numCycles"), 50.0);
        assert_eq!(record.get("sim_ops"), 0.0);
        Ok(())
    }
}
