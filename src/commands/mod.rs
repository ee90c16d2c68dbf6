//! Command implementations behind the `sonarmap` binary.
//!
//! There is a single command: `report`, which runs the whole pipeline for
//! one configuration file.

pub mod report;

pub use report::{run_report, RunOptions, RunSummary};
