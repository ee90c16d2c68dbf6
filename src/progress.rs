//! Progress feedback for the snippet enrichment phase.
//!
//! Enrichment is the only long-running phase (one request per issue), so it
//! gets an `indicatif` bar on stderr.
//!
//! # Progress Behavior
//!
//! - **Quiet Mode**: No progress output (respects `SONARMAP_QUIET` env var and `--quiet` flag)
//! - **Non-TTY**: Gracefully disables progress bars in CI and piped output
//!
//! # Examples
//!
//! ```rust,no_run
//! use sonarmap::progress::{ProgressConfig, ProgressManager, TEMPLATE_SNIPPETS};
//!
//! let manager = ProgressManager::new(ProgressConfig::from_env(false));
//! let progress = manager.create_bar(100, TEMPLATE_SNIPPETS);
//! progress.set_message("Fetching snippets");
//! for _ in 0..100 {
//!     progress.inc(1);
//! }
//! progress.finish_with_message("Snippets fetched");
//! ```

use indicatif::{ProgressBar, ProgressStyle};

// Progress bar template
pub const TEMPLATE_SNIPPETS: &str = "📄 {msg} {pos}/{len} issues ({percent}%) - {eta}";

/// Configuration for progress display behavior
#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    /// Whether to suppress all progress output
    pub quiet_mode: bool,
}

impl ProgressConfig {
    /// Create progress configuration from environment and CLI arguments
    pub fn from_env(quiet: bool) -> Self {
        let env_quiet = std::env::var("SONARMAP_QUIET").is_ok();
        Self {
            quiet_mode: quiet || env_quiet,
        }
    }

    /// A configuration that never draws anything
    pub fn hidden() -> Self {
        Self { quiet_mode: true }
    }

    /// Determine if progress bars should be displayed
    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }

        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }
}

/// Creates progress bars that respect [`ProgressConfig`]
#[derive(Debug, Clone)]
pub struct ProgressManager {
    config: ProgressConfig,
}

impl ProgressManager {
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    /// Create a progress bar with the given length and template
    ///
    /// Returns a hidden progress bar if progress should not be shown
    pub fn create_bar(&self, len: u64, template: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        match ProgressStyle::default_bar().template(template) {
            Ok(style) => pb.set_style(style.progress_chars("█▓▒░  ")),
            Err(e) => log::debug!("Invalid progress bar template: {}", e),
        }
        pb
    }
}
