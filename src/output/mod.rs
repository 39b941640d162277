//! Run summary printed on stdout
//!
//! The summary is either coloured text for people reading CI logs or a JSON
//! document for workflows that post-process the run.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::{describe_convergence, TextFormatter, VersionChangeType};

use crate::cli::CliArgs;
use crate::config::Settings;
use crate::engine::ConvergenceResult;
use std::io::{IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How much of the run the text summary shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Summary and upstream outcome only
    Quiet,
    #[default]
    Normal,
    /// Also prints the rendered markdown report
    Verbose,
}

#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    pub dry_run: bool,
    pub color: bool,
}

impl OutputConfig {
    /// Output settings for one invocation.
    ///
    /// `dry_run` comes from the resolved settings since it may be set in the
    /// config file. Colour is used only on a terminal without `NO_COLOR`.
    pub fn for_run(args: &CliArgs, settings: &Settings) -> Self {
        let format = if args.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        let verbosity = match (args.quiet, args.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };
        let color = std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();

        Self {
            format,
            verbosity,
            dry_run: settings.dry_run,
            color,
        }
    }
}

pub trait OutputFormatter {
    /// Write the summary of a finished run
    fn format(&self, result: &ConvergenceResult, writer: &mut dyn Write) -> std::io::Result<()>;
}

pub fn create_formatter(config: &OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(
            config.verbosity,
            config.dry_run,
            config.color,
        )),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.dry_run)),
    }
}
