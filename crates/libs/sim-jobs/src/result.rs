//! Job outcomes and their serialized records.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sim_config::Predictor;

use crate::job::JobSpec;
use crate::prelude::*;

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    /// The region of interest ended; statistics cover it.
    Completed,
    /// The simulator exited cleanly without closing a region of interest.
    CompletedNoRoi,
    /// Launch failure, non-zero exit or panic inside the runner.
    Crashed,
    /// Killed after exceeding its time budget.
    TimedOut,
}

impl JobStatus {
    /// Whether the job produced usable statistics.
    pub fn is_success(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::CompletedNoRoi)
    }

    /// Kebab-case name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Completed => "completed",
            JobStatus::CompletedNoRoi => "completed-no-roi",
            JobStatus::Crashed => "crashed",
            JobStatus::TimedOut => "timed-out",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one job.
#[derive(Debug, Clone)]
pub struct JobResult {
    /// The job that ran.
    pub job: Arc<JobSpec>,
    /// Exit classification.
    pub status: JobStatus,
    /// Elapsed real time.
    pub wall_duration: Duration,
    /// Copy of the job's output directory.
    pub output_dir: PathBuf,
    /// Process exit code, when the process exited on its own.
    pub exit_code: Option<i32>,
    /// Index of the statistics dump holding the region of interest.
    pub stats_dump: usize,
    /// Why the job failed, if it did.
    pub message: Option<String>,
}

impl JobResult {
    /// A crashed job that never produced an exit code.
    pub fn crashed(job: Arc<JobSpec>, wall_duration: Duration, message: impl Into<String>) -> Self {
        Self {
            output_dir: job.output_dir.clone(),
            job,
            status: JobStatus::Crashed,
            wall_duration,
            exit_code: None,
            stats_dump: 0,
            message: Some(message.into()),
        }
    }

    /// Flatten into a serializable record.
    pub fn record(&self) -> JobRecord {
        JobRecord {
            job_tag: self.job.tag.clone(),
            benchmark: self.job.benchmark.clone(),
            variant: self.job.variant,
            output_dir: self.output_dir.clone(),
            exit_status: self.status,
            wall_duration: self.wall_duration.as_secs_f64(),
            exit_code: self.exit_code,
            stats_dump: self.stats_dump,
            message: self.message.clone(),
        }
    }
}

/// One line of the job ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Experiment group identifier.
    pub job_tag: String,
    /// Benchmark under test.
    pub benchmark: String,
    /// Predictor variant under test.
    pub variant: Predictor,
    /// Output directory of the job.
    pub output_dir: PathBuf,
    /// Exit classification.
    pub exit_status: JobStatus,
    /// Elapsed real time in seconds.
    pub wall_duration: f64,
    /// Process exit code.
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// Statistics dump holding the region of interest, counted from zero.
    #[serde(default)]
    pub stats_dump: usize,
    /// Failure reason.
    #[serde(default)]
    pub message: Option<String>,
}

impl JobRecord {
    /// Serialize as a single JSON line, without trailing newline.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Arc<JobSpec> {
        Arc::new(JobSpec {
            tag: String::from("microbench_tests"),
            executable_path: PathBuf::from("build/X86/gem5.opt"),
            config_script_path: PathBuf::from("gem5-config/run_micro.py"),
            output_dir: PathBuf::from("results/microbench_tests/CCa/LTAGE"),
            benchmark: String::from("CCa"),
            variant: Predictor::Ltage,
            workload_path: PathBuf::from("microbenchmark/CCa/bench.X86"),
        })
    }

    #[test]
    fn record_exposes_ledger_fields() -> Result<()> {
        let result = JobResult::crashed(job(), Duration::from_millis(1500), "boom");
        let line = result.record().to_json_line()?;
        let value: serde_json::Value = serde_json::from_str(&line)?;

        assert_eq!(value["job_tag"], "microbench_tests");
        assert_eq!(value["output_dir"], "results/microbench_tests/CCa/LTAGE");
        assert_eq!(value["exit_status"], "crashed");
        assert_eq!(value["wall_duration"], 1.5);
        assert_eq!(value["variant"], "LTAGE");
        assert!(!line.contains('\n'));
        Ok(())
    }

    #[test]
    fn status_names_match_serde() -> Result<()> {
        for status in [
            JobStatus::Completed,
            JobStatus::CompletedNoRoi,
            JobStatus::Crashed,
            JobStatus::TimedOut,
        ] {
            assert_eq!(serde_json::to_string(&status)?, format!("\"{status}\""));
        }
        Ok(())
    }
}
