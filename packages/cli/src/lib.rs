//! # microcosm-cli
//!
//! The producer/consumer demonstration system, hosted on the microcosm
//! scheduler and driven from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Ten rounds, one producer
//! microcosm --rounds 10
//!
//! # Three producers fanning into one consumer, settings from a file
//! microcosm --producers 3 --config scheduler.json
//!
//! # Interactive mode, runs until interrupted
//! microcosm --forever
//! ```
//!
//! A config file holds [`SchedulerConfig`](microcosm_runtime::SchedulerConfig)
//! as JSON, e.g. `{"max_rounds": 20, "exit_when_idle": true}`.

pub mod demo;
pub mod error;
pub mod logging;
pub mod sample;

pub use demo::{load_config, run_demo, DemoOptions, DemoReport};
pub use error::{CliError, Result};
