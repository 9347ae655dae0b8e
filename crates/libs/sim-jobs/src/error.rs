//! Job orchestration error types.
//!
//! Only problems detected while preparing a batch are errors. Failures of
//! individual jobs are reported as [`crate::result::JobStatus`] values.

use std::path::PathBuf;

/// Job orchestration errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] sim_config::error::Error),

    /// Two jobs of the same batch would write to the same directory.
    #[error("Output directory {0:?} is used by more than one job")]
    DuplicateOutputDir(PathBuf),
}
