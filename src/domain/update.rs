//! Update and update suggestion types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One outdated dependency declaration found in one manifest
///
/// Versions are opaque strings: whatever the version checker proposed is
/// what gets written, and nothing here compares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    /// Dependency name, unique within one manifest section
    pub name: String,
    /// Manifest the update belongs to
    pub manifest_path: PathBuf,
    /// Version currently declared (empty if the manifest did not declare it)
    pub current_version: String,
    /// Version proposed by the checker
    pub new_version: String,
}

impl Update {
    /// Creates a new Update
    pub fn new(
        name: impl Into<String>,
        manifest_path: impl Into<PathBuf>,
        current_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            manifest_path: manifest_path.into(),
            current_version: current_version.into(),
            new_version: new_version.into(),
        }
    }

    /// Returns true if this update targets the given manifest
    pub fn applies_to(&self, manifest: &Path) -> bool {
        self.manifest_path == manifest
    }
}

/// Rendered preview of one manifest after its updates were applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSuggestion {
    /// Manifest the preview was rendered from
    pub file_path: PathBuf,
    /// Code fence language for the report
    pub content_type: String,
    /// Full manifest text after mutation
    pub rendered_content: String,
}

impl UpdateSuggestion {
    /// Creates a new UpdateSuggestion
    pub fn new(
        file_path: impl Into<PathBuf>,
        content_type: impl Into<String>,
        rendered_content: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            content_type: content_type.into(),
            rendered_content: rendered_content.into(),
        }
    }
}
