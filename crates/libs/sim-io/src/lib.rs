//! Process execution for simulation jobs.
//!
//! Spawns an external program, forwards its output line by line over a
//! channel and kills it on request.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::{Arc, atomic::AtomicBool};
//!
//! use sim_io::runner::{RunEvent, Runner};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::new("build/X86/gem5.opt")
//!         .args(["gem5-config/run_micro.py", "LTAGE", "microbenchmark/CCa/bench.X86"]);
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     let outcome = runner.run(tx, Arc::new(AtomicBool::new(false))).await;
//!
//!     while let Some(event) = rx.recv().await {
//!         if let RunEvent::Line { text, .. } = event {
//!             print!("{text}");
//!         }
//!     }
//!     println!("exit code: {:?}", outcome.code());
//! }
//! ```

pub mod process;
pub mod runner;
