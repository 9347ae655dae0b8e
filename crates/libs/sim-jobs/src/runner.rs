//! Single job execution.
//!
//! A runner turns one [`JobSpec`] into one [`JobResult`]. It never returns an
//! error: launch failures, crashes and timeouts are all reported through the
//! result's status so sibling jobs keep running.

use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use sim_config::SimulatorConfig;
use sim_config::layout::{DUMP_END_MARKER, SIMOUT_FILE, STATS_FILE};
use sim_config::sim_config::DEFAULT_ROI_END_GRACE_SECS;
use sim_io::runner::{OutputStream, RunEvent, Runner};
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::job::JobSpec;
use crate::result::{JobResult, JobStatus};
use crate::roi::{RoiTracker, RoiTransition, parse_exit_event};

/// How often deadlines are checked while waiting for simulator output.
const EVENT_POLL: Duration = Duration::from_millis(100);

/// Executes one job to completion.
pub trait JobRunner: Send + Sync {
    /// Run `job`, resolving once it is over.
    fn run(&self, job: Arc<JobSpec>) -> impl Future<Output = JobResult> + Send;
}

/// Runs jobs as external simulator processes.
#[derive(Debug, Clone)]
pub struct SimulatorRunner {
    /// Flag pointing the simulator at the output directory, e.g. `--outdir`.
    outdir_flag: Option<String>,
    /// Kill the simulator after this long.
    timeout: Option<Duration>,
    /// How long the simulator may keep running after the ROI ended.
    roi_end_grace: Duration,
}

impl Default for SimulatorRunner {
    fn default() -> Self {
        Self {
            outdir_flag: None,
            timeout: None,
            roi_end_grace: Duration::from_secs(DEFAULT_ROI_END_GRACE_SECS),
        }
    }
}

impl SimulatorRunner {
    /// Runner configured from the simulator settings.
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            outdir_flag: config.outdir_flag.clone(),
            timeout: config.timeout,
            roi_end_grace: config.roi_end_grace,
        }
    }

    /// Pass `<flag>=<output_dir>` before the positional arguments.
    pub fn with_outdir_flag(mut self, flag: impl Into<String>) -> Self {
        self.outdir_flag = Some(flag.into());
        self
    }

    /// Kill jobs running longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Time allowed between the end of the ROI and the simulator's exit.
    pub fn with_roi_end_grace(mut self, grace: Duration) -> Self {
        self.roi_end_grace = grace;
        self
    }

    /// Builds the process runner for a job.
    ///
    /// Arguments are `[<flag>=<output_dir>] <config_script> <variant> <workload>`
    /// and the working directory is the job's output directory. Relative paths
    /// are resolved against the launcher's directory first; a bare executable
    /// name is left to the `PATH` lookup.
    fn build_runner(&self, job: &JobSpec) -> Runner {
        let executable = if job.executable_path.components().count() > 1 {
            absolute(&job.executable_path)
        } else {
            job.executable_path.clone()
        };
        let output_dir = absolute(&job.output_dir);

        let mut runner = Runner::new(executable.to_string_lossy());
        if let Some(flag) = &self.outdir_flag {
            runner = runner.arg(format!("{}={}", flag, output_dir.display()));
        }
        runner
            .arg(absolute(&job.config_script_path).to_string_lossy())
            .arg(job.variant_label())
            .arg(absolute(&job.workload_path).to_string_lossy())
            .current_dir(output_dir)
    }
}

/// `path` made absolute against the current directory, unchanged on failure.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Number of complete dumps in the statistics log, 0 when there is none yet.
///
/// The simulator resets its counters at `workbegin` without dumping, so the
/// first dump written afterwards covers the region of interest. Its index is
/// the number of dumps already complete when `workbegin` is seen.
async fn complete_dumps(output_dir: &Path) -> usize {
    match tokio::fs::read(output_dir.join(STATS_FILE)).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.trim_start().starts_with(DUMP_END_MARKER))
            .count(),
        Err(_) => 0,
    }
}

impl JobRunner for SimulatorRunner {
    async fn run(&self, job: Arc<JobSpec>) -> JobResult {
        let start = Instant::now();

        let workload = absolute(&job.workload_path);
        if !matches!(tokio::fs::try_exists(&workload).await, Ok(true)) {
            error!("{} - Workload {:?} not found", job, workload);
            return JobResult::crashed(
                Arc::clone(&job),
                start.elapsed(),
                format!("workload not found: {}", workload.display()),
            );
        }

        if let Err(err) = tokio::fs::create_dir_all(&job.output_dir).await {
            error!("{} - Failed to create {:?} - {}", job, job.output_dir, err);
            return JobResult::crashed(
                Arc::clone(&job),
                start.elapsed(),
                format!("failed to create output directory: {err}"),
            );
        }

        let runner = self.build_runner(&job);
        info!("{} - {}", job, runner.command_line());

        let (tx, mut rx) = unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = Arc::clone(&stop);
            tokio::spawn(async move { runner.run(tx, stop).await })
        };

        let deadline = self.timeout.map(|timeout| start + timeout);
        let mut grace_deadline: Option<Instant> = None;
        let mut tracker = RoiTracker::new();
        let mut stats_dump = 0;
        let mut launch_error = None;
        let mut timed_out = false;
        let mut logs: Vec<String> = Vec::new();

        loop {
            match timeout(EVENT_POLL, rx.recv()).await {
                Ok(Some(RunEvent::SpawnFailed(err))) => {
                    error!("{} - Failed to start simulator {}", job, err);
                    launch_error = Some(err);
                }
                Ok(Some(RunEvent::Spawned { pid })) => {
                    info!("{} - Simulation started (pid {:?})", job, pid);
                }
                Ok(Some(RunEvent::Exited { success, killed })) => {
                    if killed {
                        info!("{} - Simulator stopped", job);
                    } else if success {
                        info!("{} - Simulation ended successfully", job);
                    } else {
                        warn!("{} - Simulation ended with failure", job);
                    }
                }
                Ok(Some(RunEvent::Line { stream, text: line })) => {
                    let event = match stream {
                        OutputStream::Stdout => parse_exit_event(&line),
                        OutputStream::Stderr => None,
                    };
                    if let Some(cause) = event {
                        match tracker.observe(&cause) {
                            Some(RoiTransition::ResetStats) => {
                                stats_dump = complete_dumps(&job.output_dir).await;
                                info!("{} - ROI begin, stats from dump {}", job, stats_dump);
                            }
                            Some(RoiTransition::SnapshotStats) => {
                                info!("{} - ROI end, stats final", job);
                                grace_deadline = Some(Instant::now() + self.roi_end_grace);
                            }
                            _ => {}
                        }
                    }
                    logs.push(line);
                }
                Ok(None) => break,
                Err(_) => {}
            }

            if stop.load(Ordering::Relaxed) {
                continue;
            }
            let now = Instant::now();
            if grace_deadline.is_some_and(|limit| now >= limit) {
                info!("{} - Stopping simulator after ROI end", job);
                stop.store(true, Ordering::Relaxed);
            } else if !tracker.roi_completed() && deadline.is_some_and(|limit| now >= limit) {
                warn!("{} - Timed out after {:?}", job, now - start);
                timed_out = true;
                stop.store(true, Ordering::Relaxed);
            }
        }

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("{} - Failed to join process task - {}", job, err);
                Default::default()
            }
        };
        tracker.process_exited();
        let wall_duration = start.elapsed();

        if launch_error.is_none() {
            let simout = job.output_dir.join(SIMOUT_FILE);
            if let Err(err) = tokio::fs::write(&simout, logs.concat()).await {
                warn!("{} - Failed to write simulator output - {}", job, err);
            }
        }

        let (status, message) = if let Some(err) = launch_error {
            (JobStatus::Crashed, Some(err))
        } else if timed_out {
            (
                JobStatus::TimedOut,
                Some(format!("exceeded {:?}", self.timeout.unwrap_or_default())),
            )
        } else if tracker.roi_completed() {
            (JobStatus::Completed, None)
        } else {
            match outcome.exit_status {
                Some(status) if status.success() => (JobStatus::CompletedNoRoi, None),
                Some(status) => (
                    JobStatus::Crashed,
                    Some(format!("simulator exited with {status}")),
                ),
                None => (
                    JobStatus::Crashed,
                    Some(String::from("exit status unavailable")),
                ),
            }
        };

        info!("{} - {} in {:.2?}", job, status, wall_duration);
        JobResult {
            output_dir: job.output_dir.clone(),
            job,
            status,
            wall_duration,
            exit_code: outcome.code(),
            stats_dump,
            message,
        }
    }
}
