//! outdater - dependency update bot CLI
//!
//! Discovers outdated Node.js dependencies and keeps one update pull request
//! (or one tracking comment on the current pull request) in sync with them.

use clap::Parser;
use outdater::cli::CliArgs;
use outdater::config::{FileConfig, Settings};
use outdater::orchestrator::Orchestrator;
use outdater::output::{create_formatter, OutputConfig};
use outdater::progress::Progress;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flags
fn init_tracing(args: &CliArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let file = FileConfig::discover(args.config.as_deref(), Path::new("."))?;
    let settings = Settings::resolve(&args, file)?;

    let show_progress = !args.quiet && !args.json && !Progress::in_ci();
    let orchestrator = Orchestrator::new(settings.clone()).with_progress(show_progress);
    let result = orchestrator.run().await?;

    let formatter = create_formatter(&OutputConfig::for_run(&args, &settings));

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if result.has_install_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
