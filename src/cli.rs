use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sonarmap")]
#[command(
    about = "Fetch SonarQube issues and render them as JSON, a spreadsheet and an HTML report",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON, or TOML when it ends in .toml)
    pub config: PathBuf,

    /// Directory the artifacts are written to (overrides `output_dir`)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Only log warnings and errors, and draw no progress bar
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Parallel snippet lookups (overrides `snippet_workers`)
    #[arg(long = "workers", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Skip snippet lookups; every issue is reported without source lines
    #[arg(long = "skip-snippets")]
    pub skip_snippets: bool,
}

impl Cli {
    /// Log level implied by `-v`/`-q`
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Warn;
        }
        match self.verbosity {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Initialise `env_logger` at `level`; `RUST_LOG` takes precedence.
pub fn init_logging(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_target(false);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A logger may already be installed when embedded in tests
    let _ = builder.try_init();
}
