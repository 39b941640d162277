//! Version specification types for npm-style ranges
//!
//! Handles version constraints like `^1.2.3`, `~1.2.3`, `>=1.0.0`, `1.2.3`.
//! The prefix is kept so an upgrade can be written back in the same style
//! the manifest author chose.

use serde::{Deserialize, Serialize};

/// The kind of version specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpecKind {
    /// Exact version (e.g., `1.2.3`)
    Exact,
    /// Caret range (e.g., `^1.2.3`) - compatible with major version
    Caret,
    /// Tilde range (e.g., `~1.2.3`) - compatible with minor version
    Tilde,
    /// Greater than or equal (e.g., `>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (e.g., `>1.2.3`)
    Greater,
    /// Less than or equal (e.g., `<=1.2.3`)
    LessOrEqual,
    /// Less than (e.g., `<1.2.3`)
    Less,
    /// Wildcard (e.g., `1.2.*`, `*`)
    Wildcard,
    /// Complex range (e.g., `>=1.0.0 <2.0.0`)
    Range,
}

impl VersionSpecKind {
    /// Returns true if bumping the version keeps the constraint meaningful.
    ///
    /// Upper bounds, wildcards and compound ranges are left alone.
    pub fn is_upgradable(&self) -> bool {
        matches!(
            self,
            VersionSpecKind::Exact
                | VersionSpecKind::Caret
                | VersionSpecKind::Tilde
                | VersionSpecKind::GreaterOrEqual
                | VersionSpecKind::Greater
        )
    }
}

/// A version specification with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// The kind of version specification
    pub kind: VersionSpecKind,
    /// The raw version string as it appears in the manifest
    pub raw: String,
    /// The extracted version number (without prefix)
    pub version: String,
    /// Optional prefix to preserve during updates (e.g., `^`, `~`, `>=`)
    pub prefix: Option<String>,
}

impl VersionSpec {
    /// Creates a new VersionSpec
    pub fn new(kind: VersionSpecKind, raw: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            version: version.into(),
            prefix: None,
        }
    }

    /// Creates a new VersionSpec with prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Formats a new version while preserving the original prefix
    pub fn format_updated(&self, new_version: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}{}", prefix, new_version),
            None => new_version.to_string(),
        }
    }
}
