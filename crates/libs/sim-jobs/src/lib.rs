//! Simulation job orchestration.
//!
//! Expands an experiment into a job space, runs each job as an external
//! simulator process and collects one [`JobResult`] per job through a
//! bounded [`WorkerPool`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//!
//! use sim_config::SimConfig;
//! use sim_jobs::{JobSpaceBuilder, SimulatorRunner, WorkerPool};
//!
//! # async fn launch() -> sim_jobs::prelude::Result<()> {
//! let config = SimConfig::builtin();
//! let experiment = config.experiment("1")?;
//! let benchmarks = experiment.benchmarks(&config.simulator.benchmarks_dir)?;
//! let jobs = JobSpaceBuilder::from_experiment(&config, experiment)
//!     .build(&benchmarks, &experiment.predictors)?;
//!
//! let runner = Arc::new(SimulatorRunner::from_config(&config.simulator));
//! let pool = WorkerPool::new(NonZeroUsize::new(4).unwrap());
//! for result in pool.run(jobs, runner).await {
//!     println!("{} {}", result.job, result.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod job;
pub mod ledger;
pub mod pool;
pub mod prelude;
pub mod result;
pub mod roi;
pub mod runner;
pub mod space;

pub use job::JobSpec;
pub use pool::WorkerPool;
pub use result::{JobRecord, JobResult, JobStatus};
pub use runner::{JobRunner, SimulatorRunner};
pub use space::JobSpaceBuilder;
