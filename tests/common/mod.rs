// Shared fixtures for sonarmap integration tests
#![allow(dead_code)]

use sonarmap::config::ReportConfig;
use sonarmap::core::Issue;
use sonarmap::progress::ProgressConfig;
use sonarmap::testkit::{sample_config, IssueBuilder};
use sonarmap::RunOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Config writing its artifacts into `<dir>/out`
pub fn config_in(dir: &TempDir) -> ReportConfig {
    let mut config = sample_config();
    config.output_dir = dir.path().join("out");
    config
}

pub fn quiet_options() -> RunOptions {
    RunOptions {
        skip_snippets: false,
        progress: ProgressConfig::hidden(),
    }
}

/// A mixed issue set: two vulnerabilities, one bug, one code smell and one
/// issue of a type outside the three categories.
pub fn mixed_issues() -> Vec<Issue> {
    vec![
        IssueBuilder::vulnerability("V1")
            .component("shop:src/app/views.py")
            .severity("CRITICAL")
            .line(12)
            .message("Make sure this SQL query is safe")
            .comment("alice", "2024-01-15T10:30:00+0000", "<p>Confirmed</p>")
            .build(),
        IssueBuilder::vulnerability("V2")
            .severity("BLOCKER")
            .status("CONFIRMED")
            .line(40)
            .build(),
        IssueBuilder::bug("B1").severity("MAJOR").build(),
        IssueBuilder::code_smell("C1")
            .component("shop:web/index.tsx")
            .severity("MINOR")
            .line(3)
            .build(),
        IssueBuilder::new("H1", "SECURITY_HOTSPOT").severity("INFO").build(),
    ]
}

/// Write a JSON config file and return its path
pub fn write_config_file(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, body).expect("write config");
    path
}
