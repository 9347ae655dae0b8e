//! Configuration management for simulation batches.
//!
//! Provides the predictor roster, experiment definitions and the output
//! directory layout shared by the launcher and the result aggregator.
//!
//! # Usage
//!
//! ```rust
//! use sim_config::{SimConfig, Predictor};
//!
//! let config = SimConfig::builtin();
//! let experiment = config.experiment("1").unwrap();
//! assert!(experiment.predictors.contains(&Predictor::Ltage));
//! ```

pub mod error;
pub mod experiment;
pub mod layout;
pub mod predictor;
pub mod prelude;
pub mod sim_config;

pub use experiment::Experiment;
pub use layout::OutputLayout;
pub use predictor::Predictor;
pub use sim_config::{SimConfig, SimUserConfig, SimulatorConfig};
