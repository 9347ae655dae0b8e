//! Statistics extraction and result aggregation.
//!
//! Reads the simulator's statistics logs out of job output directories and
//! turns them into a benchmark by predictor [`ResultTable`] with derived
//! `ipc`, `cpi` and `accuracy` columns.
//!
//! # Usage
//!
//! ```rust,no_run
//! use sim_config::{Predictor, SimConfig};
//! use sim_stats::ResultAggregator;
//!
//! # fn table() -> sim_stats::prelude::Result<()> {
//! let config = SimConfig::builtin();
//! let layout = &config.simulator.layout;
//! let benchmarks = vec![String::from("CCa"), String::from("CCl")];
//!
//! let table = ResultAggregator::new(layout)
//!     .with_ledger(&layout.ledger_path("microbench_tests"))?
//!     .aggregate("microbench_tests", &benchmarks, &Predictor::ALL);
//! println!("{table}");
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod columns;
pub mod error;
pub mod extractor;
pub mod log;
pub mod prelude;
pub mod table;

pub use aggregator::ResultAggregator;
pub use columns::StatColumn;
pub use extractor::{StatRecord, StatsExtractor};
pub use log::StatsLog;
pub use table::{ResultRow, ResultTable};
