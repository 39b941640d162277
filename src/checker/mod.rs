//! Version checkers
//!
//! A version checker answers one question for one manifest: which declared
//! dependencies have a newer version, and what should they be set to.
//!
//! This module provides:
//! - The `VersionChecker` seam the discovery phase calls
//! - `RegistryChecker`, which queries the package registry directly
//! - `NcuChecker`, which delegates to `npm-check-updates`

mod ncu;
mod registry;

pub use ncu::NcuChecker;
pub use registry::RegistryChecker;

use crate::error::{ConfigError, DiscoveryError};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Ordered `(name, new version)` pairs proposed for one manifest
pub type Upgrades = Vec<(String, String)>;

/// Trait for version checkers
#[async_trait]
pub trait VersionChecker: Send + Sync {
    /// Propose upgrades for the manifest at `manifest_path`.
    ///
    /// Order of the result is the order updates are reported in.
    async fn check(&self, manifest_path: &Path) -> Result<Upgrades, DiscoveryError>;
}

/// Selectable checker implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckerKind {
    /// Query the npm registry
    #[default]
    Registry,
    /// Run npm-check-updates
    Ncu,
}

impl FromStr for CheckerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "registry" => Ok(CheckerKind::Registry),
            "ncu" | "npm-check-updates" => Ok(CheckerKind::Ncu),
            _ => Err(ConfigError::UnknownChecker {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckerKind::Registry => write!(f, "registry"),
            CheckerKind::Ncu => write!(f, "ncu"),
        }
    }
}
