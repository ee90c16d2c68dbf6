//! sonarmap: turns a SonarQube issue feed into reports.
//!
//! A run fetches every issue page for one project branch, attaches the source
//! snippet around each issue, dumps the enriched list as JSON, and renders a
//! per-category spreadsheet and a bilingual HTML report.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod testkit;

pub use crate::commands::{run_report, RunOptions, RunSummary};
pub use crate::config::{load_config, ReportConfig};
pub use crate::core::{Issue, IssueType, Language, Severity};
pub use crate::errors::{Error, Result, SourceError};
pub use crate::source::{HttpIssueSource, IssueSource};
