use anyhow::Result;
use clap::Parser;
use sonarmap::cli::{init_logging, Cli};
use sonarmap::commands::{run_report, RunOptions, RunSummary};
use sonarmap::config::load_config;
use sonarmap::errors::Error;
use sonarmap::progress::ProgressConfig;
use sonarmap::source::HttpIssueSource;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    match run(cli) {
        Ok(summary) => {
            print!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(cli: Cli) -> Result<RunSummary> {
    let mut config = load_config(&cli.config)?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(workers) = cli.workers {
        config.snippet_workers = usize::from(workers);
    }

    let source = HttpIssueSource::new(&config);
    let options = RunOptions {
        skip_snippets: cli.skip_snippets,
        progress: ProgressConfig::from_env(cli.quiet),
    };
    run_report(&config, &source, &options)
}

// Pure function: library errors carry their own exit code
fn exit_code_for(error: &anyhow::Error) -> u8 {
    error.downcast_ref::<Error>().map_or(1, Error::exit_code)
}
