//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Updates grouped by manifest, with semantic change type (major/minor/patch)
//! - Install step outcomes
//! - What happened upstream

use crate::domain::Update;
use crate::engine::{CommentAction, Convergence, ConvergenceResult};
use crate::git::BranchCheckout;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two declared versions.
    ///
    /// Range operators (`^`, `~`, `>=`, ...) are ignored.
    pub fn from_versions(old: &str, new: &str) -> Self {
        let parse = |v: &str| -> Option<(u64, u64)> {
            let v = v.trim_start_matches(|c: char| !c.is_ascii_digit());
            let mut parts = v.split(['.', '-', '+']);
            let major = parts.next()?.parse().ok()?;
            let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
            Some((major, minor))
        };

        match (parse(old), parse(new)) {
            (Some((old_major, old_minor)), Some((new_major, new_minor))) => {
                if new_major != old_major {
                    VersionChangeType::Major
                } else if new_minor != old_minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// One line describing the upstream outcome
pub fn describe_convergence(convergence: &Convergence) -> String {
    fn comment(action: &CommentAction) -> String {
        match action {
            CommentAction::Created { id } => format!("created tracking comment {}", id),
            CommentAction::Updated { id } => format!("updated tracking comment {}", id),
            CommentAction::Deleted { id } => format!("deleted tracking comment {}", id),
            CommentAction::Unchanged => "no tracking comment needed".to_string(),
        }
    }
    fn checkout(checkout: &BranchCheckout) -> &'static str {
        match checkout {
            BranchCheckout::Reused => "reused",
            BranchCheckout::Created => "created",
        }
    }

    match convergence {
        Convergence::Comment {
            pull_request,
            action,
        } => format!("Pull request #{}: {}", pull_request, comment(action)),
        Convergence::PullRequestOpened {
            number,
            branch,
            checkout: how,
        } => format!(
            "Opened pull request #{} from {} branch {}",
            number,
            checkout(how),
            branch
        ),
        Convergence::ExistingPullRequest {
            number,
            action,
            checkout: how,
        } => {
            let pushed = how
                .map(|how| format!(", pushed {} branch", checkout(&how)))
                .unwrap_or_default();
            format!(
                "Pull request #{} already open: {}{}",
                number,
                comment(action),
                pushed
            )
        }
        Convergence::NothingToDo => "Nothing to do".to_string(),
        Convergence::Skipped { reason } => format!("Upstream skipped: {}", reason),
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if !self.dry_run {
            String::new()
        } else if self.color {
            format!("{} ", "(dry-run)".cyan())
        } else {
            "(dry-run) ".to_string()
        }
    }

    /// Updates grouped by manifest, in order of first appearance
    fn group_by_manifest(updates: &[Update]) -> Vec<(&Path, Vec<&Update>)> {
        let mut groups: Vec<(&Path, Vec<&Update>)> = Vec::new();
        for update in updates {
            match groups
                .iter_mut()
                .find(|(path, _)| *path == update.manifest_path.as_path())
            {
                Some((_, group)) => group.push(update),
                None => groups.push((update.manifest_path.as_path(), vec![update])),
            }
        }
        groups
    }

    /// Format a single update line
    fn format_update_line(
        &self,
        update: &Update,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let change_type =
            VersionChangeType::from_versions(&update.current_version, &update.new_version);

        if self.color {
            let name_display = format!("{:width$}", update.name, width = max_name_len);
            writeln!(
                writer,
                "  {} {} {} {} [{}]",
                name_display,
                update.current_version.dimmed(),
                "→".dimmed(),
                update.new_version.bright_white().bold(),
                change_type.colored_label()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]",
                update.name,
                update.current_version,
                update.new_version,
                change_type.label(),
                width = max_name_len
            )
        }
    }

    /// Write the manifest header line
    fn format_manifest_header(
        &self,
        path: &Path,
        count: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let noun = if count == 1 { "update" } else { "updates" };
        let path_display = path.display().to_string();
        if self.color {
            writeln!(
                writer,
                "{}{} {} {}",
                self.dry_run_prefix(),
                path_display.bold(),
                count.to_string().green(),
                noun
            )
        } else {
            writeln!(
                writer,
                "{}{} {} {}",
                self.dry_run_prefix(),
                path_display,
                count,
                noun
            )
        }
    }

    /// Write install outcomes; failures always, successes unless quiet
    fn format_installs(
        &self,
        result: &ConvergenceResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for install in &result.installs {
            let location = install.working_dir.display();
            if install.success {
                if self.verbosity == Verbosity::Quiet {
                    continue;
                }
                if self.color {
                    writeln!(writer, "{} {} ({})", "✓".green(), install.command, location)?;
                } else {
                    writeln!(writer, "ok {} ({})", install.command, location)?;
                }
            } else {
                if self.color {
                    writeln!(writer, "{} {} ({})", "✗".red(), install.command, location)?;
                } else {
                    writeln!(writer, "failed {} ({})", install.command, location)?;
                }
                let stderr = install.stderr.trim();
                if !stderr.is_empty() {
                    writeln!(writer, "    {}", stderr)?;
                }
            }
        }
        Ok(())
    }

    /// Write the change type breakdown
    fn format_summary(
        &self,
        result: &ConvergenceResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let total = result.updates.len();
        if total == 0 {
            let message = "All dependencies are up to date";
            if self.color {
                return writeln!(writer, "{}{}", self.dry_run_prefix(), message.green());
            }
            return writeln!(writer, "{}{}", self.dry_run_prefix(), message);
        }

        let (mut major, mut minor, mut patch) = (0, 0, 0);
        for update in &result.updates {
            match VersionChangeType::from_versions(&update.current_version, &update.new_version) {
                VersionChangeType::Major => major += 1,
                VersionChangeType::Minor => minor += 1,
                VersionChangeType::Patch => patch += 1,
                VersionChangeType::Unknown => {}
            }
        }

        let noun = if total == 1 { "update" } else { "updates" };
        if self.color {
            writeln!(
                writer,
                "{}{} {} ({} major, {} minor, {} patch)",
                self.dry_run_prefix(),
                total.to_string().bold(),
                noun,
                major.to_string().red(),
                minor.to_string().yellow(),
                patch.to_string().green()
            )
        } else {
            writeln!(
                writer,
                "{}{} {} ({} major, {} minor, {} patch)",
                self.dry_run_prefix(),
                total,
                noun,
                major,
                minor,
                patch
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &ConvergenceResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            let max_name_len = result
                .updates
                .iter()
                .map(|u| u.name.len())
                .max()
                .unwrap_or(0)
                .max(20);

            for (path, updates) in Self::group_by_manifest(&result.updates) {
                self.format_manifest_header(path, updates.len(), writer)?;
                for update in updates {
                    self.format_update_line(update, max_name_len, writer)?;
                }
                writeln!(writer)?;
            }
        }

        self.format_installs(result, writer)?;
        self.format_summary(result, writer)?;

        let upstream = describe_convergence(&result.convergence);
        if self.color {
            writeln!(writer, "{}", upstream.dimmed())?;
        } else {
            writeln!(writer, "{}", upstream)?;
        }

        if self.verbosity == Verbosity::Verbose && !result.report.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "{}", result.report.trim_end())?;
        }

        Ok(())
    }
}
