//! Manifest storage, parsing and workspace resolution
//!
//! This module provides:
//! - A storage seam for reading and writing manifest files
//! - A typed, order-preserving model of package.json
//! - Workspace member resolution for monorepos

mod package_json;
mod workspace;

pub use package_json::{DependencySection, PackageJson};
pub use workspace::resolve_workspace_manifests;

use crate::error::ManifestError;
use std::fs;
use std::path::Path;

/// Storage for manifest files
pub trait ManifestStore: Send + Sync {
    /// Read the full text of a manifest
    fn read_manifest(&self, path: &Path) -> Result<String, ManifestError>;

    /// Replace the full text of a manifest
    fn write_manifest(&self, path: &Path, content: &str) -> Result<(), ManifestError>;

    /// Returns true if the manifest exists
    fn exists(&self, path: &Path) -> bool;
}

/// Manifest store backed by the local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsManifestStore;

impl FsManifestStore {
    /// Create a new file system store
    pub fn new() -> Self {
        Self
    }
}

impl ManifestStore for FsManifestStore {
    fn read_manifest(&self, path: &Path) -> Result<String, ManifestError> {
        fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
    }

    fn write_manifest(&self, path: &Path, content: &str) -> Result<(), ManifestError> {
        fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Read and parse a package.json through a store
pub fn load_package_json(
    store: &dyn ManifestStore,
    path: &Path,
) -> Result<PackageJson, ManifestError> {
    let content = store.read_manifest(path)?;
    PackageJson::parse(path, &content)
}
