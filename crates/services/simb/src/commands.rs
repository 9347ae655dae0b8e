//! Command handlers for simb.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use sim_config::SimConfig;
use sim_jobs::ledger::write_ledger;
use sim_jobs::{JobRecord, JobResult, JobSpaceBuilder, JobStatus, SimulatorRunner, WorkerPool};
use sim_stats::ResultAggregator;
use tracing::{info, warn};

use crate::prelude::*;

/// Handles the parse command to display configuration information.
pub fn handle_parse(config: &SimConfig) -> Result<()> {
    let simulator = &config.simulator;

    println!("Configuration parsed successfully");
    println!("Global version: {}", config.global.version);
    println!("Simulator: {:?}", simulator.executable);
    println!("  Config script: {:?}", simulator.config_script);
    println!("  Output flag: {:?}", simulator.outdir_flag);
    println!("  Results root: {:?}", simulator.layout.results_root());
    println!("  Benchmarks: {:?}", simulator.benchmarks_dir);
    println!("  Timeout: {:?}", simulator.timeout);
    println!("Number of experiments: {}", config.experiments.len());

    for experiment in config.experiments.iter() {
        println!("\nExperiment {}: {}", experiment.id, experiment.tag);
        let labels: Vec<&str> = experiment
            .predictors
            .iter()
            .map(|predictor| predictor.label())
            .collect();
        println!("  Predictors: {}", labels.join(", "));
        match &experiment.benchmarks {
            Some(benchmarks) => println!("  Benchmarks: {}", benchmarks.join(", ")),
            None => println!("  Benchmarks: every directory in {:?}", simulator.benchmarks_dir),
        }
    }

    Ok(())
}

/// Handles the launch command.
///
/// Runs every job of the experiment, printing one JSON record per job on
/// stdout as it finishes, then writes the job ledger.
pub async fn handle_launch(
    config: &SimConfig,
    parallelism: NonZeroUsize,
    selector: &str,
) -> Result<()> {
    let experiment = config.experiment(selector)?;
    let benchmarks = experiment.benchmarks(&config.simulator.benchmarks_dir)?;
    let jobs = JobSpaceBuilder::from_experiment(config, experiment)
        .build(&benchmarks, &experiment.predictors)?;
    info!(
        "Launching {} jobs for experiment {} ({} benchmarks, {} predictors)",
        jobs.len(),
        experiment.tag,
        benchmarks.len(),
        experiment.predictors.len()
    );

    let runner = Arc::new(SimulatorRunner::from_config(&config.simulator));
    let results = WorkerPool::new(parallelism)
        .run_with(jobs, runner, |result| {
            match result.record().to_json_line() {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("{} - Failed to serialize record - {}", result.job, err),
            }
        })
        .await;

    let records: Vec<JobRecord> = results.iter().map(JobResult::record).collect();
    let ledger = config.simulator.layout.ledger_path(&experiment.tag);
    write_ledger(&ledger, &records)?;

    let count = |status: JobStatus| {
        results
            .iter()
            .filter(|result| result.status == status)
            .count()
    };
    info!(
        "Experiment {} done: {} completed, {} without ROI, {} crashed, {} timed out. Ledger at {:?}",
        experiment.tag,
        count(JobStatus::Completed),
        count(JobStatus::CompletedNoRoi),
        count(JobStatus::Crashed),
        count(JobStatus::TimedOut),
        ledger
    );
    Ok(())
}

/// Handles the table command.
///
/// Prints either the full table or a single column, optionally normalized,
/// and optionally writes the full table as CSV.
pub fn handle_table(
    config: &SimConfig,
    selector: &str,
    stat: Option<&str>,
    normalize: bool,
    output: Option<&Path>,
) -> Result<()> {
    let experiment = config.experiment(selector)?;
    let layout = &config.simulator.layout;
    let benchmarks = experiment.benchmarks(&config.simulator.benchmarks_dir)?;

    let table = ResultAggregator::new(layout)
        .with_ledger(&layout.ledger_path(&experiment.tag))?
        .aggregate(&experiment.tag, &benchmarks, &experiment.predictors);

    match stat {
        Some(column) => {
            let values = if normalize {
                table.select_normalized(column)?
            } else {
                table.select(column)?
            };
            println!("benchmark,predictor,{column}");
            for cell in values {
                println!("{},{},{}", cell.benchmark, cell.predictor, cell.value);
            }
        }
        None => print!("{table}"),
    }

    if let Some(path) = output {
        table.write_csv_path(path)?;
        info!("Wrote {} rows to {:?}", table.len(), path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sim_config::{Predictor, SimUserConfig};
    use sim_config::layout::STATS_FILE;

    use super::*;

    fn config(root: &Path) -> SimConfig {
        let toml = format!(
            r#"
            [global]
            version = "1.0.0"

            [simulator]
            executable = "{root}/no-such-gem5"
            config_script = "run_micro.py"
            results_root = "{root}/results"
            benchmarks_dir = "{root}/microbenchmark"
            workload_file = "bench.X86"

            [[experiments]]
            id = "1"
            tag = "microbench_tests"
            predictors = ["LocalBP", "LTAGE"]
            "#,
            root = root.display()
        );
        let user = SimUserConfig::from_toml(&toml).expect("valid config");
        SimConfig::from_user_config(user).expect("valid config")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn launch_writes_ledger_for_discovered_benchmarks() {
        let dir = tempfile::tempdir().expect("Couldn't create temp dir");
        for benchmark in ["CCa", "CCl"] {
            fs::create_dir_all(dir.path().join("microbenchmark").join(benchmark))
                .expect("Couldn't create benchmark dir");
        }
        let config = config(dir.path());

        handle_launch(&config, NonZeroUsize::MIN, "1")
            .await
            .expect("launch failed");

        let ledger = config.simulator.layout.ledger_path("microbench_tests");
        let records = sim_jobs::ledger::read_ledger(&ledger).expect("ledger missing");
        assert_eq!(records.len(), 4);
        assert!(records
            .iter()
            .all(|record| record.exit_status == JobStatus::Crashed));
    }

    #[test]
    fn unknown_experiment_is_rejected() {
        let dir = tempfile::tempdir().expect("Couldn't create temp dir");
        let config = config(dir.path());
        assert!(matches!(
            handle_table(&config, "42", None, false, None),
            Err(Error::Config(sim_config::error::Error::UnknownExperiment(_)))
        ));
    }

    #[test]
    fn table_writes_csv() {
        let dir = tempfile::tempdir().expect("Couldn't create temp dir");
        fs::create_dir_all(dir.path().join("microbenchmark").join("CCa"))
            .expect("Couldn't create benchmark dir");
        let config = config(dir.path());
        let job_dir = config
            .simulator
            .layout
            .job_dir("microbench_tests", "CCa", Predictor::Ltage.label());
        fs::create_dir_all(&job_dir).expect("Couldn't create job dir");
        fs::write(
            job_dir.join(STATS_FILE),
            "sim_insts 100 # insts\nsystem.cpu.numCycles 50 # cycles\n",
        )
        .expect("Couldn't write stats");

        let csv_path = dir.path().join("plots").join("table.csv");
        handle_table(&config, "1", Some("ipc"), false, Some(&csv_path)).expect("table failed");

        let csv = fs::read_to_string(&csv_path).expect("csv missing");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("CCa,LocalBP,0,0,"));
        assert!(lines[2].starts_with("CCa,LTAGE,50,100,"));
        assert!(lines[2].contains(",2,0.5,"));
    }
}
