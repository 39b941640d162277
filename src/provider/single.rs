//! Provider for the root manifest of the project

use crate::checker::VersionChecker;
use crate::error::{DiscoveryError, ManifestError};
use crate::manifest::ManifestStore;
use crate::package_manager::InstallResult;
use crate::provider::{
    discover_manifest, DiscoveryResult, ManifestMutator, ManifestProvider, MutationResult,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Checks and updates exactly one manifest
pub struct SingleManifestProvider {
    manifest_path: PathBuf,
    checker: Arc<dyn VersionChecker>,
    store: Arc<dyn ManifestStore>,
    mutator: Arc<ManifestMutator>,
}

impl SingleManifestProvider {
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        checker: Arc<dyn VersionChecker>,
        store: Arc<dyn ManifestStore>,
        mutator: Arc<ManifestMutator>,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            checker,
            store,
            mutator,
        }
    }
}

#[async_trait]
impl ManifestProvider for SingleManifestProvider {
    fn name(&self) -> &'static str {
        "manifest"
    }

    async fn discover_updates(&self) -> Result<DiscoveryResult, DiscoveryError> {
        let updates = discover_manifest(
            self.checker.as_ref(),
            self.store.as_ref(),
            &self.manifest_path,
        )
        .await?;

        let mut result = DiscoveryResult::default();
        result.record(&self.manifest_path, updates);
        Ok(result)
    }

    fn apply_mutation(
        &self,
        discovery: &DiscoveryResult,
        should_apply: bool,
    ) -> Result<MutationResult, ManifestError> {
        self.mutator
            .apply(discovery, should_apply, &self.manifest_path)
    }

    fn install(&self, dir: &Path) -> Option<InstallResult> {
        self.mutator.install(dir)
    }
}
