//! Bounded worker pool.
//!
//! Every job gets its own task, but at most `parallelism` of them hold a
//! permit and run at the same time. Each job yields exactly one
//! [`JobResult`]; a runner that panics is reported as [`JobStatus::Crashed`].

use std::any::Any;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{error, info};

use crate::job::JobSpec;
use crate::result::{JobResult, JobStatus};
use crate::runner::JobRunner;

/// Runs a batch of jobs with bounded concurrency.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    parallelism: NonZeroUsize,
}

impl WorkerPool {
    /// Create a pool running at most `parallelism` jobs at once.
    pub fn new(parallelism: NonZeroUsize) -> Self {
        Self { parallelism }
    }

    /// Maximum number of concurrently running jobs.
    pub fn parallelism(&self) -> usize {
        self.parallelism.get()
    }

    /// Run every job and wait for all of them.
    ///
    /// Results come back in completion order, not submission order.
    pub async fn run<R>(&self, jobs: Vec<JobSpec>, runner: Arc<R>) -> Vec<JobResult>
    where
        R: JobRunner + 'static,
    {
        self.run_with(jobs, runner, |_| {}).await
    }

    /// Like [`WorkerPool::run`], calling `on_result` as each job finishes.
    pub async fn run_with<R, F>(
        &self,
        jobs: Vec<JobSpec>,
        runner: Arc<R>,
        mut on_result: F,
    ) -> Vec<JobResult>
    where
        R: JobRunner + 'static,
        F: FnMut(&JobResult),
    {
        let total = jobs.len();
        info!("Running {} jobs on {} workers", total, self.parallelism);

        let batch_start = Instant::now();
        let permits = Arc::new(Semaphore::new(self.parallelism.get()));
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<Id, Arc<JobSpec>> = HashMap::with_capacity(total);
        for job in jobs {
            let job = Arc::new(job);
            let permits = Arc::clone(&permits);
            let runner = Arc::clone(&runner);
            let task_job = Arc::clone(&job);
            let handle = tasks.spawn(async move {
                let job = task_job;
                let queued_at = Instant::now();
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(err) => {
                        return JobResult::crashed(
                            job,
                            queued_at.elapsed(),
                            format!("worker pool closed: {err}"),
                        );
                    }
                };

                let worker_job = Arc::clone(&job);
                let started_at = Instant::now();
                let outcome = tokio::spawn(async move { runner.run(worker_job).await }).await;
                match outcome {
                    Ok(result) => result,
                    Err(err) => {
                        let message = join_error_message(err);
                        error!("{} - Worker failed - {}", job, message);
                        JobResult::crashed(job, started_at.elapsed(), message)
                    }
                }
            });
            pending.insert(handle.id(), job);
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next_with_id().await {
            if let Some(result) = settle(joined, &mut pending, batch_start) {
                on_result(&result);
                results.push(result);
            }
        }

        let failed = results
            .iter()
            .filter(|result| !result.status.is_success())
            .count();
        info!(
            "Finished {} jobs ({} failed, {} crashed)",
            results.len(),
            failed,
            results
                .iter()
                .filter(|result| result.status == JobStatus::Crashed)
                .count()
        );
        results
    }
}

/// Turn a joined job task into its result.
///
/// A task that failed to join is reported as a crash of the job it was
/// running, so every spawned job yields a result.
fn settle(
    joined: Result<(Id, JobResult), JoinError>,
    pending: &mut HashMap<Id, Arc<JobSpec>>,
    batch_start: Instant,
) -> Option<JobResult> {
    match joined {
        Ok((id, result)) => {
            pending.remove(&id);
            Some(result)
        }
        Err(err) => {
            let Some(job) = pending.remove(&err.id()) else {
                error!("Failed to join unknown worker task - {}", err);
                return None;
            };
            let message = join_error_message(err);
            error!("{} - Failed to join worker task - {}", job, message);
            Some(JobResult::crashed(job, batch_start.elapsed(), message))
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("runner panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("runner panicked: {message}")
    } else {
        String::from("runner panicked")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use sim_config::Predictor;

    use super::*;

    fn jobs(count: usize) -> Vec<JobSpec> {
        (0..count)
            .map(|idx| JobSpec {
                tag: String::from("pool"),
                executable_path: PathBuf::from("gem5.opt"),
                config_script_path: PathBuf::from("run_micro.py"),
                output_dir: PathBuf::from(format!("out/bench{idx}/LTAGE")),
                benchmark: format!("bench{idx}"),
                variant: Predictor::Ltage,
                workload_path: PathBuf::from(format!("microbenchmark/bench{idx}/bench.X86")),
            })
            .collect()
    }

    fn completed(job: Arc<JobSpec>) -> JobResult {
        JobResult {
            output_dir: job.output_dir.clone(),
            job,
            status: JobStatus::Completed,
            wall_duration: Duration::ZERO,
            exit_code: Some(0),
            stats_dump: 0,
            message: None,
        }
    }

    struct InstantRunner;

    impl JobRunner for InstantRunner {
        async fn run(&self, job: Arc<JobSpec>) -> JobResult {
            completed(job)
        }
    }

    struct PanicsOn(&'static str);

    impl JobRunner for PanicsOn {
        async fn run(&self, job: Arc<JobSpec>) -> JobResult {
            if job.benchmark == self.0 {
                panic!("cannot simulate {}", job.benchmark);
            }
            completed(job)
        }
    }

    #[derive(Default)]
    struct CountingRunner {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl JobRunner for CountingRunner {
        async fn run(&self, job: Arc<JobSpec>) -> JobResult {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            completed(job)
        }
    }

    fn pool(parallelism: usize) -> WorkerPool {
        WorkerPool::new(NonZeroUsize::new(parallelism).expect("parallelism must be positive"))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn returns_one_result_per_job() {
        let results = pool(3).run(jobs(7), Arc::new(InstantRunner)).await;

        assert_eq!(results.len(), 7);
        let dirs: HashSet<&PathBuf> = results.iter().map(|result| &result.output_dir).collect();
        assert_eq!(dirs.len(), 7);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panicking_runner_only_crashes_its_job() {
        let results = pool(2).run(jobs(5), Arc::new(PanicsOn("bench3"))).await;

        assert_eq!(results.len(), 5);
        for result in results.iter() {
            if result.job.benchmark == "bench3" {
                assert_eq!(result.status, JobStatus::Crashed);
                let message = result.message.as_deref().unwrap_or_default();
                assert!(message.contains("cannot simulate bench3"), "{message}");
            } else {
                assert_eq!(result.status, JobStatus::Completed);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn never_exceeds_parallelism() {
        let runner = Arc::new(CountingRunner::default());
        let results = pool(2).run(jobs(8), Arc::clone(&runner)).await;

        assert_eq!(results.len(), 8);
        let peak = runner.peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak concurrency was {peak}");
        assert!(peak >= 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn callback_sees_every_result() {
        let mut seen = 0;
        let results = pool(4)
            .run_with(jobs(6), Arc::new(InstantRunner), |_| seen += 1)
            .await;
        assert_eq!(seen, results.len());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lost_worker_task_still_yields_crashed_result() {
        let job = Arc::new(jobs(1).remove(0));
        let mut tasks = JoinSet::new();
        let task_job = Arc::clone(&job);
        let handle = tasks.spawn(async move { PanicsOn("bench0").run(task_job).await });
        let mut pending = HashMap::from([(handle.id(), Arc::clone(&job))]);

        let joined = tasks.join_next_with_id().await.expect("one task was spawned");
        let result = settle(joined, &mut pending, Instant::now()).expect("job result lost");

        assert_eq!(result.status, JobStatus::Crashed);
        assert_eq!(result.output_dir, job.output_dir);
        let message = result.message.as_deref().unwrap_or_default();
        assert!(message.contains("cannot simulate bench0"), "{message}");
        assert!(pending.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_batch() {
        assert!(pool(1).run(Vec::new(), Arc::new(InstantRunner)).await.is_empty());
    }
}
