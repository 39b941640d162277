//! Manifest providers
//!
//! A provider owns one way of finding manifests (a single root manifest, or
//! every member of a workspace) and runs the discover and mutate phases over
//! them.
//!
//! This module provides:
//! - Per-manifest update discovery shared by all providers
//! - The single manifest and workspace providers
//! - The manifest mutator that writes updates back and runs the install step

mod mutator;
mod single;
mod workspace;

pub use mutator::ManifestMutator;
pub use single::SingleManifestProvider;
pub use workspace::WorkspaceProvider;

use crate::checker::VersionChecker;
use crate::domain::{Update, UpdateSuggestion};
use crate::error::{DiscoveryError, ManifestError};
use crate::manifest::{load_package_json, ManifestStore};
use crate::package_manager::InstallResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of the discover phase of one provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    /// Updates in discovery order
    pub updates: Vec<Update>,
    /// Manifests with at least one update, in discovery order
    pub touched: Vec<PathBuf>,
}

impl DiscoveryResult {
    /// Record the updates found in one manifest
    pub fn record(&mut self, manifest: &Path, updates: Vec<Update>) {
        if updates.is_empty() {
            return;
        }
        self.touched.push(manifest.to_path_buf());
        self.updates.extend(updates);
    }

    /// Returns true if nothing is outdated
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Outcome of the mutate phase of one provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationResult {
    /// One rendered manifest per touched manifest
    pub suggestions: Vec<UpdateSuggestion>,
    /// Where to install once every manifest is written; `None` if nothing was
    pub install_dir: Option<PathBuf>,
}

/// Trait for manifest providers
#[async_trait]
pub trait ManifestProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Find every outdated declaration this provider is responsible for
    async fn discover_updates(&self) -> Result<DiscoveryResult, DiscoveryError>;

    /// Rewrite the touched manifests; write them only if `should_apply`
    fn apply_mutation(
        &self,
        discovery: &DiscoveryResult,
        should_apply: bool,
    ) -> Result<MutationResult, ManifestError>;

    /// Run the install step in a directory named by a mutation
    fn install(&self, dir: &Path) -> Option<InstallResult>;
}

/// Discover the updates of one manifest.
///
/// The checker is asked once; each proposed upgrade becomes an update whose
/// current version is read from the manifest (runtime section first). A name
/// the manifest does not declare keeps an empty current version.
pub async fn discover_manifest(
    checker: &dyn VersionChecker,
    store: &dyn ManifestStore,
    path: &Path,
) -> Result<Vec<Update>, DiscoveryError> {
    let manifest = load_package_json(store, path)?;
    let upgrades = checker.check(path).await?;
    debug!(manifest = %path.display(), count = upgrades.len(), "checker answered");

    Ok(upgrades
        .into_iter()
        .map(|(name, new_version)| {
            let current = manifest.current_version(&name).unwrap_or_default().to_string();
            Update::new(name, path, current, new_version)
        })
        .collect())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_discover_manifest_reads_current_versions() {
        let store = MemoryStore::with(&[(
            "package.json",
            r#"{"dependencies": {"left-pad": "1.0.0"}, "devDependencies": {"jest": "^28.0.0"}}"#,
        )]);
        let checker = TableChecker::with(&[(
            "package.json",
            &[("jest", "^29.0.0"), ("left-pad", "1.1.0")],
        )]);

        let updates = discover_manifest(&checker, &store, Path::new("package.json"))
            .await
            .unwrap();

        assert_eq!(
            updates,
            vec![
                Update::new("jest", "package.json", "^28.0.0", "^29.0.0"),
                Update::new("left-pad", "package.json", "1.0.0", "1.1.0"),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_manifest_undeclared_name_is_permissive() {
        let store = MemoryStore::with(&[("package.json", r#"{"dependencies": {}}"#)]);
        let checker = TableChecker::with(&[("package.json", &[("ghost", "1.0.0")])]);

        let updates = discover_manifest(&checker, &store, Path::new("package.json"))
            .await
            .unwrap();
        assert_eq!(updates[0].current_version, "");
    }

    #[tokio::test]
    async fn test_discover_manifest_invalid_json_is_fatal() {
        let store = MemoryStore::with(&[("package.json", "{ nope")]);
        let checker = TableChecker::default();

        let err = discover_manifest(&checker, &store, Path::new("package.json"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Manifest(ManifestError::JsonParseError { .. })
        ));
    }

    #[test]
    fn test_discovery_result_record_skips_empty() {
        let mut result = DiscoveryResult::default();
        result.record(Path::new("a/package.json"), Vec::new());
        result.record(
            Path::new("b/package.json"),
            vec![Update::new("x", "b/package.json", "1", "2")],
        );
        assert_eq!(result.touched, vec![PathBuf::from("b/package.json")]);
        assert_eq!(result.updates.len(), 1);
        assert!(!result.is_empty());
    }
}
