//! package.json model for Node.js projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - workspaces (array form and yarn's `{ "packages": [...] }` form)
//!
//! The parsed document keeps its key order so a rewritten manifest only
//! differs from the original in the versions that changed.

use crate::error::ManifestError;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// The two dependency sections an update may live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencySection {
    /// `dependencies`
    Runtime,
    /// `devDependencies`
    Development,
}

impl DependencySection {
    /// Lookup order used when resolving a dependency's current version
    pub const LOOKUP_ORDER: [DependencySection; 2] =
        [DependencySection::Runtime, DependencySection::Development];

    /// JSON key of this section
    pub fn key(&self) -> &'static str {
        match self {
            DependencySection::Runtime => "dependencies",
            DependencySection::Development => "devDependencies",
        }
    }
}

impl fmt::Display for DependencySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Parsed package.json
#[derive(Debug, Clone, PartialEq)]
pub struct PackageJson {
    /// Where the manifest was read from
    path: PathBuf,
    /// Whole document; always a JSON object
    document: Value,
}

impl PackageJson {
    /// Parse manifest text read from `path`
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self, ManifestError> {
        let path = path.into();
        let document: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(&path, e.to_string()))?;

        if !document.is_object() {
            return Err(ManifestError::NotAnObject { path });
        }

        Ok(Self { path, document })
    }

    /// Path the manifest was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name/version pairs of one section, in declaration order.
    ///
    /// Entries whose value is not a string (e.g. malformed input) are skipped.
    pub fn dependencies(&self, section: DependencySection) -> Vec<(&str, &str)> {
        self.document
            .get(section.key())
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, version)| {
                        version.as_str().map(|version| (name.as_str(), version))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Version declared for `name` in one section
    pub fn version_in(&self, section: DependencySection, name: &str) -> Option<&str> {
        self.document
            .get(section.key())
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_str)
    }

    /// Current version of `name`, runtime section first
    pub fn current_version(&self, name: &str) -> Option<&str> {
        DependencySection::LOOKUP_ORDER
            .iter()
            .find_map(|section| self.version_in(*section, name))
    }

    /// Sections that currently declare `name`
    pub fn sections_containing(&self, name: &str) -> Vec<DependencySection> {
        DependencySection::LOOKUP_ORDER
            .into_iter()
            .filter(|section| {
                self.document
                    .get(section.key())
                    .and_then(Value::as_object)
                    .is_some_and(|deps| deps.contains_key(name))
            })
            .collect()
    }

    /// Overwrite the version of `name` in every section that declares it.
    ///
    /// Returns the number of sections changed; a name declared nowhere
    /// changes nothing.
    pub fn set_version(&mut self, name: &str, version: &str) -> usize {
        let sections = self.sections_containing(name);
        for section in &sections {
            if let Some(deps) = self
                .document
                .get_mut(section.key())
                .and_then(Value::as_object_mut)
            {
                deps.insert(name.to_string(), Value::String(version.to_string()));
            }
        }
        sections.len()
    }

    /// Workspace member globs declared by this manifest
    pub fn workspaces(&self) -> Vec<String> {
        let members = match self.document.get("workspaces") {
            Some(Value::Array(members)) => Some(members),
            Some(Value::Object(config)) => config.get("packages").and_then(Value::as_array),
            _ => None,
        };

        members
            .map(|members| {
                members
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if this manifest declares workspace members
    pub fn is_workspace_root(&self) -> bool {
        !self.workspaces().is_empty()
    }

    /// Serialize back to text with two-space indentation
    pub fn render(&self) -> String {
        format!("{:#}", self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> PackageJson {
        PackageJson::parse("package.json", content).unwrap()
    }

    #[test]
    fn test_parse_sections() {
        let manifest = parse(
            r#"{
                "dependencies": { "react": "^18.2.0", "lodash": "^4.17.21" },
                "devDependencies": { "typescript": "^5.0.0" }
            }"#,
        );

        assert_eq!(
            manifest.dependencies(DependencySection::Runtime),
            vec![("react", "^18.2.0"), ("lodash", "^4.17.21")]
        );
        assert_eq!(
            manifest.dependencies(DependencySection::Development),
            vec![("typescript", "^5.0.0")]
        );
    }

    #[test]
    fn test_parse_missing_sections() {
        let manifest = parse(r#"{"name": "empty"}"#);
        assert!(manifest.dependencies(DependencySection::Runtime).is_empty());
        assert!(manifest.dependencies(DependencySection::Development).is_empty());
        assert!(manifest.workspaces().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = PackageJson::parse("package.json", "not json").unwrap_err();
        assert!(matches!(err, ManifestError::JsonParseError { .. }));
    }

    #[test]
    fn test_parse_non_object() {
        let err = PackageJson::parse("package.json", "[1, 2]").unwrap_err();
        assert!(matches!(err, ManifestError::NotAnObject { .. }));
    }

    #[test]
    fn test_current_version_prefers_runtime() {
        let manifest = parse(
            r#"{
                "dependencies": { "dup": "1.0.0" },
                "devDependencies": { "dup": "2.0.0", "jest": "^29.0.0" }
            }"#,
        );
        assert_eq!(manifest.current_version("dup"), Some("1.0.0"));
        assert_eq!(manifest.current_version("jest"), Some("^29.0.0"));
        assert_eq!(manifest.current_version("missing"), None);
    }

    #[test]
    fn test_set_version_dev_only() {
        let mut manifest = parse(
            r#"{
                "dependencies": { "react": "^18.0.0" },
                "devDependencies": { "jest": "^28.0.0" }
            }"#,
        );

        assert_eq!(manifest.set_version("jest", "^29.0.0"), 1);
        assert_eq!(
            manifest.version_in(DependencySection::Development, "jest"),
            Some("^29.0.0")
        );
        assert_eq!(
            manifest.dependencies(DependencySection::Runtime),
            vec![("react", "^18.0.0")]
        );
    }

    #[test]
    fn test_set_version_runtime_only() {
        let mut manifest = parse(
            r#"{
                "dependencies": { "react": "^18.0.0" },
                "devDependencies": { "jest": "^28.0.0" }
            }"#,
        );

        assert_eq!(manifest.set_version("react", "^19.0.0"), 1);
        assert_eq!(manifest.current_version("react"), Some("^19.0.0"));
        assert_eq!(
            manifest.dependencies(DependencySection::Development),
            vec![("jest", "^28.0.0")]
        );
    }

    #[test]
    fn test_set_version_both_sections() {
        let mut manifest = parse(
            r#"{
                "dependencies": { "dup": "1.0.0" },
                "devDependencies": { "dup": "1.0.0" }
            }"#,
        );

        assert_eq!(manifest.set_version("dup", "1.1.0"), 2);
        assert_eq!(
            manifest.version_in(DependencySection::Runtime, "dup"),
            Some("1.1.0")
        );
        assert_eq!(
            manifest.version_in(DependencySection::Development, "dup"),
            Some("1.1.0")
        );
    }

    #[test]
    fn test_set_version_unknown_name() {
        let mut manifest = parse(r#"{"dependencies": {"react": "^18.0.0"}}"#);
        assert_eq!(manifest.set_version("vue", "^3.0.0"), 0);
        assert_eq!(manifest.current_version("vue"), None);
    }

    #[test]
    fn test_workspaces_array() {
        let manifest = parse(r#"{"workspaces": ["packages/*", "apps/*"]}"#);
        assert_eq!(manifest.workspaces(), vec!["packages/*", "apps/*"]);
        assert!(manifest.is_workspace_root());
    }

    #[test]
    fn test_workspaces_object() {
        let manifest = parse(r#"{"workspaces": {"packages": ["packages/*"], "nohoist": []}}"#);
        assert_eq!(manifest.workspaces(), vec!["packages/*"]);
    }

    #[test]
    fn test_render_preserves_key_order() {
        let manifest = parse(
            r#"{"name": "app", "version": "1.0.0", "dependencies": {"zod": "^3.0.0", "axios": "^1.0.0"}}"#,
        );

        let expected = r#"{
  "name": "app",
  "version": "1.0.0",
  "dependencies": {
    "zod": "^3.0.0",
    "axios": "^1.0.0"
  }
}"#;
        assert_eq!(manifest.render(), expected);
    }

    #[test]
    fn test_render_after_update() {
        let mut manifest = parse(r#"{"dependencies": {"zod": "^3.0.0", "axios": "^1.0.0"}}"#);
        manifest.set_version("axios", "^1.7.0");

        let rendered = manifest.render();
        assert!(rendered.contains("\"axios\": \"^1.7.0\""));
        assert!(rendered.find("zod").unwrap() < rendered.find("axios").unwrap());
    }
}
