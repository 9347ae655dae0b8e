//! Statistics error types.
//!
//! Reading statistics never fails: missing or malformed values resolve to
//! `0.0`. Errors only come from writing tables and reading ledgers.

/// Statistics errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Job ledger could not be read.
    #[error(transparent)]
    Jobs(#[from] sim_jobs::error::Error),

    /// Column name is not part of the result table.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}
