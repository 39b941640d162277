//! Markdown report rendering
//!
//! The same report is used as a pull request body and as the tracking
//! comment inside a pull request. Its first line carries the title, which is
//! how a later run finds the comment again.

use crate::domain::{Update, UpdateSuggestion};
use std::fmt::Write;

/// Render the report for a set of updates and suggestions
pub fn render_report(title: &str, updates: &[Update], suggestions: &[UpdateSuggestion]) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "## {}", title);
    let _ = writeln!(out);
    let _ = writeln!(out, "| Package | Manifest | Current Version | New Version |");
    let _ = writeln!(out, "|:-------:|:--------:|:---------------:|:-----------:|");
    for update in updates {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            update.name,
            update.manifest_path.display(),
            update.current_version,
            update.new_version
        );
    }

    if !suggestions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "### Suggested updates");
        for suggestion in suggestions {
            let _ = writeln!(out);
            let _ = writeln!(out, "**{}**", suggestion.file_path.display());
            let _ = writeln!(out, "```{}", suggestion.content_type);
            let _ = writeln!(out, "{}", suggestion.rendered_content.trim_end());
            let _ = writeln!(out, "```");
        }
    }

    out
}

/// Returns true if `body` is the report (or tracking comment) for `title`.
///
/// Only a body opening with the `## <title>` heading matches. The whole line
/// is compared, so the report for pull request #1 is never mistaken for the
/// one for #12, and a comment merely quoting the title is left alone.
pub fn is_report_for(body: &str, title: &str) -> bool {
    body.lines()
        .next()
        .and_then(|line| line.trim_end().strip_prefix("## "))
        .is_some_and(|heading| heading == title)
}
