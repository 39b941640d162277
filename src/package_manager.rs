//! Package manager integration for installing dependencies after updates
//!
//! This module provides:
//! - Package manager identifiers and their install commands
//! - Lockfile based detection for the `auto` setting
//! - A command execution seam and its process-backed implementation

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Node.js package managers with an install step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    /// Lockfiles in detection order
    const LOCKFILES: [(&'static str, PackageManager); 5] = [
        ("pnpm-lock.yaml", PackageManager::Pnpm),
        ("yarn.lock", PackageManager::Yarn),
        ("bun.lockb", PackageManager::Bun),
        ("bun.lock", PackageManager::Bun),
        ("package-lock.json", PackageManager::Npm),
    ];

    /// Identifier as accepted on the command line
    pub fn id(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    /// Get the install command for this package manager
    pub fn install_command(&self) -> [&'static str; 2] {
        [self.id(), "install"]
    }

    /// Detect the package manager from the lockfile in `dir` or the closest
    /// ancestor holding one.
    ///
    /// Workspace members usually share the lockfile of the workspace root.
    pub fn detect(dir: &Path) -> Option<PackageManager> {
        dir.ancestors().find_map(|candidate| {
            Self::LOCKFILES
                .iter()
                .find(|(lockfile, _)| candidate.join(lockfile).is_file())
                .map(|(_, pm)| *pm)
        })
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Configured install behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStrategy {
    /// Always use this package manager
    Fixed(PackageManager),
    /// Pick the package manager from the lockfile, npm if there is none
    Auto,
    /// Do not install after mutation
    Disabled,
}

impl Default for InstallStrategy {
    fn default() -> Self {
        InstallStrategy::Fixed(PackageManager::Yarn)
    }
}

impl InstallStrategy {
    /// Interpret a package manager identifier.
    ///
    /// `none` and any identifier we do not know disable the install step.
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "npm" => InstallStrategy::Fixed(PackageManager::Npm),
            "yarn" => InstallStrategy::Fixed(PackageManager::Yarn),
            "pnpm" => InstallStrategy::Fixed(PackageManager::Pnpm),
            "bun" => InstallStrategy::Fixed(PackageManager::Bun),
            "auto" => InstallStrategy::Auto,
            _ => InstallStrategy::Disabled,
        }
    }

    /// Package manager to run in `dir`, if any
    pub fn resolve(&self, dir: &Path) -> Option<PackageManager> {
        match self {
            InstallStrategy::Fixed(pm) => Some(*pm),
            InstallStrategy::Auto => Some(PackageManager::detect(dir).unwrap_or(PackageManager::Npm)),
            InstallStrategy::Disabled => None,
        }
    }
}

impl fmt::Display for InstallStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStrategy::Fixed(pm) => write!(f, "{}", pm),
            InstallStrategy::Auto => write!(f, "auto"),
            InstallStrategy::Disabled => write!(f, "none"),
        }
    }
}

/// Result of a package manager installation
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallResult {
    /// Directory the command ran in
    pub working_dir: PathBuf,
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard output from the command
    #[serde(skip)]
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallResult {
    /// Create a successful install result
    pub fn success(working_dir: impl Into<PathBuf>, command: impl Into<String>, stdout: String) -> Self {
        Self {
            working_dir: working_dir.into(),
            command: command.into(),
            success: true,
            stdout,
            stderr: String::new(),
        }
    }

    /// Create a failed install result
    pub fn failure(
        working_dir: impl Into<PathBuf>,
        command: impl Into<String>,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            command: command.into(),
            success: false,
            stdout,
            stderr,
        }
    }
}

/// Trait for running external commands
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `working_dir` and capture its outcome
    fn run(&self, command: &[&str], working_dir: &Path) -> InstallResult;
}

/// Command runner that executes real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    /// Create a new system command runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &[&str], working_dir: &Path) -> InstallResult {
        let command_str = command.join(" ");
        let Some((program, args)) = command.split_first() else {
            return InstallResult::failure(working_dir, command_str, String::new(), "Empty command".to_string());
        };

        match Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()
        {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    InstallResult::success(working_dir, command_str, stdout)
                } else {
                    InstallResult::failure(working_dir, command_str, stdout, stderr)
                }
            }
            Err(e) => InstallResult::failure(
                working_dir,
                command_str,
                String::new(),
                format!("Failed to execute command: {}", e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_install_command() {
        assert_eq!(PackageManager::Yarn.install_command(), ["yarn", "install"]);
        assert_eq!(PackageManager::Npm.install_command(), ["npm", "install"]);
        assert_eq!(PackageManager::Pnpm.install_command(), ["pnpm", "install"]);
        assert_eq!(PackageManager::Bun.install_command(), ["bun", "install"]);
    }

    #[test]
    fn test_strategy_from_id() {
        assert_eq!(
            InstallStrategy::from_id("yarn"),
            InstallStrategy::Fixed(PackageManager::Yarn)
        );
        assert_eq!(
            InstallStrategy::from_id("NPM"),
            InstallStrategy::Fixed(PackageManager::Npm)
        );
        assert_eq!(InstallStrategy::from_id("auto"), InstallStrategy::Auto);
        assert_eq!(InstallStrategy::from_id("none"), InstallStrategy::Disabled);
        assert_eq!(InstallStrategy::from_id("maven"), InstallStrategy::Disabled);
    }

    #[test]
    fn test_default_strategy_is_yarn() {
        assert_eq!(
            InstallStrategy::default(),
            InstallStrategy::Fixed(PackageManager::Yarn)
        );
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for strategy in [
            InstallStrategy::Fixed(PackageManager::Pnpm),
            InstallStrategy::Auto,
            InstallStrategy::Disabled,
        ] {
            assert_eq!(InstallStrategy::from_id(&strategy.to_string()), strategy);
        }
    }

    #[test]
    fn test_detect_yarn() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(PackageManager::detect(temp_dir.path()), Some(PackageManager::Yarn));
    }

    #[test]
    fn test_detect_pnpm_wins_over_npm() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("pnpm-lock.yaml"), "").unwrap();
        fs::write(temp_dir.path().join("package-lock.json"), "{}").unwrap();
        assert_eq!(PackageManager::detect(temp_dir.path()), Some(PackageManager::Pnpm));
    }

    #[test]
    fn test_detect_from_workspace_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let member = temp_dir.path().join("packages/a");
        fs::create_dir_all(&member).unwrap();
        fs::write(temp_dir.path().join("bun.lockb"), "").unwrap();
        assert_eq!(PackageManager::detect(&member), Some(PackageManager::Bun));
    }

    #[test]
    fn test_auto_falls_back_to_npm() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("isolated");
        fs::create_dir_all(&dir).unwrap();
        // Only meaningful if no ancestor of the temp dir has a lockfile.
        if PackageManager::detect(&dir).is_none() {
            assert_eq!(InstallStrategy::Auto.resolve(&dir), Some(PackageManager::Npm));
        }
    }

    #[test]
    fn test_disabled_resolves_to_none() {
        assert_eq!(InstallStrategy::Disabled.resolve(Path::new(".")), None);
    }

    #[test]
    fn test_install_result_failure() {
        let result = InstallResult::failure(".", "yarn install", String::new(), "error".to_string());
        assert!(!result.success);
        assert_eq!(result.command, "yarn install");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = SystemCommandRunner::new().run(&["outdater-no-such-binary", "install"], temp_dir.path());
        assert!(!result.success);
        assert!(result.stderr.contains("Failed to execute command"));
    }

    #[test]
    fn test_system_runner_empty_command() {
        let result = SystemCommandRunner::new().run(&[], Path::new("."));
        assert!(!result.success);
    }
}
