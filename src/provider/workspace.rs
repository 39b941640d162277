//! Provider fanning out over the members of a workspace
//!
//! The root manifest names its members as globs in `workspaces`. Each
//! member manifest is checked on its own, in declaration order, and a
//! failure in any of them aborts the whole fan-out.

use crate::checker::VersionChecker;
use crate::domain::Language;
use crate::error::{DiscoveryError, ManifestError};
use crate::manifest::{load_package_json, resolve_workspace_manifests, ManifestStore};
use crate::package_manager::InstallResult;
use crate::provider::{
    discover_manifest, DiscoveryResult, ManifestMutator, ManifestProvider, MutationResult,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Checks and updates every workspace member manifest
pub struct WorkspaceProvider {
    root_manifest: PathBuf,
    checker: Arc<dyn VersionChecker>,
    store: Arc<dyn ManifestStore>,
    mutator: Arc<ManifestMutator>,
}

impl WorkspaceProvider {
    pub fn new(
        root_manifest: impl Into<PathBuf>,
        checker: Arc<dyn VersionChecker>,
        store: Arc<dyn ManifestStore>,
        mutator: Arc<ManifestMutator>,
    ) -> Self {
        Self {
            root_manifest: root_manifest.into(),
            checker,
            store,
            mutator,
        }
    }

    /// Member manifests in fan-out order
    pub fn member_manifests(&self) -> Result<Vec<PathBuf>, ManifestError> {
        let root = load_package_json(self.store.as_ref(), &self.root_manifest)?;
        if !root.is_workspace_root() {
            return Ok(Vec::new());
        }
        resolve_workspace_manifests(&self.root_manifest, &root.workspaces(), Language::NodeJs)
    }
}

#[async_trait]
impl ManifestProvider for WorkspaceProvider {
    fn name(&self) -> &'static str {
        "workspace"
    }

    async fn discover_updates(&self) -> Result<DiscoveryResult, DiscoveryError> {
        let manifests = self.member_manifests()?;
        if manifests.is_empty() {
            debug!(root = %self.root_manifest.display(), "no workspace members");
            return Ok(DiscoveryResult::default());
        }
        info!(members = manifests.len(), "checking workspace members");

        let mut result = DiscoveryResult::default();
        for manifest in &manifests {
            let updates =
                discover_manifest(self.checker.as_ref(), self.store.as_ref(), manifest).await?;
            result.record(manifest, updates);
        }
        Ok(result)
    }

    fn apply_mutation(
        &self,
        discovery: &DiscoveryResult,
        should_apply: bool,
    ) -> Result<MutationResult, ManifestError> {
        // Installing from the root covers every member
        self.mutator
            .apply(discovery, should_apply, &self.root_manifest)
    }

    fn install(&self, dir: &Path) -> Option<InstallResult> {
        self.mutator.install(dir)
    }
}
