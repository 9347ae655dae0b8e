//! Configuration error types.

/// Configuration errors.
///
/// Every variant is fatal for a batch: it is raised before any job is dispatched.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// TOML deserialization failed.
    #[error(transparent)]
    Deserialization(#[from] toml::de::Error),

    /// Predictor label is not part of the roster.
    #[error("Unknown predictor '{0}'")]
    UnknownPredictor(String),

    /// Experiment selector does not match any configured experiment.
    #[error("Unknown experiment '{0}'")]
    UnknownExperiment(String),

    /// Two experiments share the same selector.
    #[error("Experiment '{0}' is defined more than once")]
    DuplicateExperiment(String),

    /// An experiment lists the same predictor twice.
    #[error("Experiment '{experiment}' lists predictor {predictor} more than once")]
    DuplicatePredictor {
        /// Experiment selector.
        experiment: String,
        /// Repeated predictor label.
        predictor: String,
    },

    /// An experiment has nothing to vary.
    #[error("Experiment '{0}' has no predictors")]
    NoPredictors(String),

    /// A label cannot be used as a directory name.
    #[error("Invalid label '{0}': must be a single path component")]
    InvalidLabel(String),
}
