//! Experiment definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::validate_label;
use crate::predictor::Predictor;
use crate::prelude::*;

/// User-defined experiment. Usually loaded from TOML files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimUserExperiment {
    /// Selector used on the command line to pick this experiment.
    pub id: String,
    /// Group identifier. Used as the directory under the results root.
    pub tag: String,
    /// Predictor labels to sweep. Must be part of the roster.
    pub predictors: Vec<String>,
    /// Benchmarks to run. When omitted every directory under the simulator's
    /// benchmarks directory is used.
    #[serde(default)]
    pub benchmarks: Option<Vec<String>>,
}

/// Validated experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    /// Selector.
    pub id: String,
    /// Group identifier.
    pub tag: String,
    /// Predictors in sweep order.
    pub predictors: Vec<Predictor>,
    /// Explicit benchmark list, if any.
    pub benchmarks: Option<Vec<String>>,
}

impl Experiment {
    /// Validate a user experiment against the roster.
    pub fn from_user_experiment(experiment: SimUserExperiment) -> Result<Self> {
        validate_label(&experiment.tag)?;
        if experiment.predictors.is_empty() {
            return Err(Error::NoPredictors(experiment.id));
        }

        let mut seen = HashSet::new();
        let mut predictors = Vec::with_capacity(experiment.predictors.len());
        for label in experiment.predictors.iter() {
            let predictor: Predictor = label.parse()?;
            if !seen.insert(predictor) {
                return Err(Error::DuplicatePredictor {
                    experiment: experiment.id,
                    predictor: label.clone(),
                });
            }
            predictors.push(predictor);
        }

        Ok(Self {
            id: experiment.id,
            tag: experiment.tag,
            predictors,
            benchmarks: experiment.benchmarks,
        })
    }

    /// Benchmarks of this experiment.
    ///
    /// Returns the explicit list when present, otherwise the sorted names of
    /// the subdirectories of `benchmarks_dir`.
    pub fn benchmarks(&self, benchmarks_dir: &Path) -> Result<Vec<String>> {
        match &self.benchmarks {
            Some(benchmarks) => Ok(benchmarks.clone()),
            None => discover_benchmarks(benchmarks_dir),
        }
    }
}

/// List benchmark directories under `dir`, sorted by name.
///
/// Hidden entries (including `.git`) and plain files are skipped.
pub fn discover_benchmarks(dir: &Path) -> Result<Vec<String>> {
    let mut benchmarks = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        benchmarks.push(name);
    }
    benchmarks.sort();
    debug!("Discovered {} benchmarks in {:?}", benchmarks.len(), dir);
    Ok(benchmarks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_experiment(predictors: &[&str]) -> SimUserExperiment {
        SimUserExperiment {
            id: String::from("1"),
            tag: String::from("microbench_tests"),
            predictors: predictors.iter().map(|p| String::from(*p)).collect(),
            benchmarks: None,
        }
    }

    #[test]
    fn keeps_predictor_order() -> Result<()> {
        let experiment =
            Experiment::from_user_experiment(user_experiment(&["LocalBP", "LTAGE"]))?;
        assert_eq!(
            experiment.predictors,
            vec![Predictor::Local, Predictor::Ltage]
        );
        Ok(())
    }

    #[test]
    fn rejects_repeated_predictor() {
        let err = Experiment::from_user_experiment(user_experiment(&["LTAGE", "LTAGE"]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePredictor { .. }));
    }

    #[test]
    fn rejects_empty_sweep() {
        let err = Experiment::from_user_experiment(user_experiment(&[])).unwrap_err();
        assert!(matches!(err, Error::NoPredictors(_)));
    }

    #[test]
    fn discovery_skips_hidden_entries_and_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["MI", "CCa", ".git", "EI"] {
            fs::create_dir(dir.path().join(name))?;
        }
        fs::write(dir.path().join("README"), "not a benchmark")?;

        assert_eq!(discover_benchmarks(dir.path())?, vec!["CCa", "EI", "MI"]);
        Ok(())
    }

    #[test]
    fn explicit_list_wins_over_discovery() -> Result<()> {
        let mut user = user_experiment(&["LTAGE"]);
        user.benchmarks = Some(vec![String::from("DP1f")]);
        let experiment = Experiment::from_user_experiment(user)?;
        let benchmarks = experiment.benchmarks(Path::new("/definitely/not/here"))?;
        assert_eq!(benchmarks, vec!["DP1f"]);
        Ok(())
    }
}
