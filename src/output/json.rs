//! JSON output formatter for machine processing

use crate::domain::{Update, UpdateSuggestion};
use crate::engine::{Convergence, ConvergenceResult};
use crate::output::OutputFormatter;
use crate::package_manager::InstallResult;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Whether this was a dry-run
    dry_run: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

/// JSON representation of a run
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    dry_run: bool,
    title: &'a str,
    updates: &'a [Update],
    suggestions: &'a [UpdateSuggestion],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    installs: &'a [InstallResult],
    convergence: &'a Convergence,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ConvergenceResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: self.dry_run,
            title: &result.title,
            updates: &result.updates,
            suggestions: &result.suggestions,
            installs: &result.installs,
            convergence: &result.convergence,
        };
        let json = serde_json::to_string_pretty(&output)?;
        writeln!(writer, "{}", json)
    }
}
