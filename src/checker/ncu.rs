//! npm-check-updates backed version checker
//!
//! Runs `npm-check-updates --jsonUpgraded` against a single manifest and
//! reads the `{ "name": "new version" }` object it prints.

use crate::checker::{Upgrades, VersionChecker};
use crate::error::DiscoveryError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Default command used to invoke npm-check-updates
const DEFAULT_COMMAND: [&str; 3] = ["npx", "--yes", "npm-check-updates"];

/// Version checker that shells out to npm-check-updates
#[derive(Debug, Clone)]
pub struct NcuChecker {
    command: Vec<String>,
}

impl Default for NcuChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl NcuChecker {
    /// Create a checker running ncu through `npx`
    pub fn new() -> Self {
        Self::with_command(DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect())
    }

    /// Create a checker with a custom base command (e.g. a global `ncu`)
    pub fn with_command(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Full argument list for one manifest
    fn args_for(&self, manifest_path: &Path) -> Vec<String> {
        let mut args = self.command.clone();
        args.push("--jsonUpgraded".to_string());
        args.push("--packageFile".to_string());
        args.push(manifest_path.display().to_string());
        args
    }
}

#[async_trait]
impl VersionChecker for NcuChecker {
    async fn check(&self, manifest_path: &Path) -> Result<Upgrades, DiscoveryError> {
        let args = self.args_for(manifest_path);
        let command_line = args.join(" ");
        let Some((program, rest)) = args.split_first() else {
            return Err(DiscoveryError::Command {
                command: command_line,
                message: "empty command".to_string(),
            });
        };

        debug!(command = %command_line, "running version checker");
        let output = Command::new(program)
            .args(rest)
            .output()
            .await
            .map_err(|e| DiscoveryError::Command {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(DiscoveryError::Command {
                command: command_line,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_upgrades(manifest_path, &String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the JSON object printed by `--jsonUpgraded`, keeping its order
fn parse_upgrades(manifest_path: &Path, stdout: &str) -> Result<Upgrades, DiscoveryError> {
    let invalid = |message: String| DiscoveryError::InvalidOutput {
        path: manifest_path.to_path_buf(),
        message,
    };

    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Upgrades::new());
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()))?;
    let Value::Object(entries) = value else {
        return Err(invalid("expected a JSON object".to_string()));
    };

    entries
        .into_iter()
        .map(|(name, version)| match version {
            Value::String(version) => Ok((name, version)),
            other => Err(invalid(format!("version of '{}' is not a string: {}", name, other))),
        })
        .collect()
}
