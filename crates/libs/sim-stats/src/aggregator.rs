//! Result aggregation.
//!
//! Walks every `(benchmark, predictor)` pair of an experiment, reads its
//! statistics and builds the [`ResultTable`]. Pairs without a usable log still
//! get a row, with zero raw values and `NaN` ratios.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sim_config::{OutputLayout, Predictor};
use sim_jobs::JobRecord;
use sim_jobs::ledger::read_ledger;
use tracing::{debug, info, warn};

use crate::columns::StatColumn;
use crate::extractor::StatsExtractor;
use crate::prelude::*;
use crate::table::{ResultRow, ResultTable};

/// Builds result tables from job output directories.
#[derive(Debug, Clone)]
pub struct ResultAggregator<'a> {
    layout: &'a OutputLayout,
    dumps: HashMap<PathBuf, usize>,
}

impl<'a> ResultAggregator<'a> {
    /// Aggregate the first dump of every statistics log under `layout`.
    pub fn new(layout: &'a OutputLayout) -> Self {
        Self {
            layout,
            dumps: HashMap::new(),
        }
    }

    /// Read each job's statistics from the dump holding its region of interest.
    pub fn with_records<'r>(mut self, records: impl IntoIterator<Item = &'r JobRecord>) -> Self {
        for record in records {
            if record.stats_dump > 0 {
                self.dumps
                    .insert(record.output_dir.clone(), record.stats_dump);
            }
        }
        self
    }

    /// Like [`ResultAggregator::with_records`], reading the ledger at `path`.
    ///
    /// A missing ledger leaves every job on its first dump.
    pub fn with_ledger(self, path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No job ledger at {:?}, reading first dumps", path);
            return Ok(self);
        }
        let records = read_ledger(path)?;
        Ok(self.with_records(records.iter()))
    }

    /// Dump recorded for `output_dir`.
    pub fn dump(&self, output_dir: &Path) -> usize {
        self.dumps.get(output_dir).copied().unwrap_or(0)
    }

    /// One row per `(benchmark, predictor)`, benchmark-major.
    pub fn aggregate(
        &self,
        tag: &str,
        benchmarks: &[String],
        predictors: &[Predictor],
    ) -> ResultTable {
        let mut rows = Vec::with_capacity(benchmarks.len() * predictors.len());
        let mut missing = 0;
        for benchmark in benchmarks {
            for predictor in predictors {
                let output_dir = self.layout.job_dir(tag, benchmark, predictor.label());
                let record = StatsExtractor::extract_record(
                    benchmark,
                    *predictor,
                    &output_dir,
                    self.dump(&output_dir),
                    StatColumn::stat_names(),
                );
                if record.values.values().all(|value| *value == 0.0) {
                    missing += 1;
                }
                rows.push(ResultRow::from_record(&record));
            }
        }

        if missing > 0 {
            warn!("{} of {} jobs have no statistics", missing, rows.len());
        }
        info!("Aggregated {} rows for {}", rows.len(), tag);
        ResultTable::new(rows)
    }
}
