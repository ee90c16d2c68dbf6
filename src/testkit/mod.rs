//! Testing infrastructure for sonarmap.
//!
//! Provides an in-memory [`MockIssueSource`] so the fetch and enrichment
//! stages, and the whole report run, can be tested without a SonarQube
//! server, plus small fixture builders.
//!
//! # Quick Start
//!
//! ```rust
//! use sonarmap::pipeline::fetch::{fetch_all_issues, FetchOptions};
//! use sonarmap::testkit::{IssueBuilder, MockIssueSource};
//!
//! let source = MockIssueSource::new()
//!     .with_page(vec![IssueBuilder::bug("AX-1").line(3).build()], 1);
//!
//! let options = FetchOptions { page_size: 500, max_pages: 20 };
//! let issues = fetch_all_issues(&source, &options).unwrap();
//! assert_eq!(issues.len(), 1);
//! ```

pub mod mock_source;

pub use mock_source::{IssueBuilder, MockIssueSource};

use crate::config::ReportConfig;

/// A valid configuration pointing at an unroutable server
pub fn sample_config() -> ReportConfig {
    let mut config: ReportConfig = serde_json::from_str("{}").expect("defaults must parse");
    config.url = "https://sonar.invalid".to_string();
    config.project_id = "shop".to_string();
    config.project_name = "Shop".to_string();
    config.project_version = "1.4.0".to_string();
    config.branch = "main".to_string();
    config.session_token = "test-token".to_string();
    config.request_delay_ms = 0;
    config
}
