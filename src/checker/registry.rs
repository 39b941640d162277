//! Registry-backed version checker
//!
//! Reads a manifest, asks the registry for the latest release of every
//! dependency declared with an upgradable range, and proposes the latest
//! version written in the same style as the declaration (`^1.2.0` stays a
//! caret range).

use crate::checker::{Upgrades, VersionChecker};
use crate::error::{DiscoveryError, RegistryError};
use crate::manifest::{load_package_json, DependencySection, ManifestStore};
use crate::parser::{get_parser, VersionParser};
use crate::registry::RegistryAdapter;
use async_trait::async_trait;
use semver::Version;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Version checker that queries a package registry
pub struct RegistryChecker {
    store: Arc<dyn ManifestStore>,
    adapter: Box<dyn RegistryAdapter>,
    parser: Box<dyn VersionParser>,
}

impl RegistryChecker {
    /// Create a checker reading manifests from `store` and versions from `adapter`
    pub fn new(store: Arc<dyn ManifestStore>, adapter: Box<dyn RegistryAdapter>) -> Self {
        let parser = get_parser(adapter.language());
        Self {
            store,
            adapter,
            parser,
        }
    }
}

#[async_trait]
impl VersionChecker for RegistryChecker {
    async fn check(&self, manifest_path: &Path) -> Result<Upgrades, DiscoveryError> {
        let manifest = load_package_json(self.store.as_ref(), manifest_path)?;
        let mut seen = HashSet::new();
        let mut upgrades = Upgrades::new();

        for section in DependencySection::LOOKUP_ORDER {
            for (name, declared) in manifest.dependencies(section) {
                // A name declared in both sections is proposed once; the
                // mutator rewrites every section holding it.
                if !seen.insert(name) {
                    continue;
                }

                let Some(spec) = self.parser.parse(declared) else {
                    debug!(package = name, declared, "not a registry version, skipping");
                    continue;
                };
                if !spec.kind.is_upgradable() {
                    debug!(package = name, declared, "range not upgradable, skipping");
                    continue;
                }

                let latest = match self.adapter.latest_version(name).await {
                    Ok(latest) => latest,
                    Err(RegistryError::PackageNotFound { .. }) => {
                        debug!(
                            package = name,
                            registry = self.adapter.registry_name(),
                            "package not published, skipping"
                        );
                        continue;
                    }
                    Err(source) => {
                        return Err(DiscoveryError::Registry {
                            path: manifest_path.to_path_buf(),
                            source,
                        })
                    }
                };

                if is_upgrade(&spec.version, &latest) {
                    upgrades.push((name.to_string(), spec.format_updated(&latest)));
                }
            }
        }

        Ok(upgrades)
    }
}

/// Returns true if `latest` is a newer release `current` should move to.
///
/// A prerelease is only proposed when the current version is already a
/// prerelease. Anything that is not valid semver is left alone.
fn is_upgrade(current: &str, latest: &str) -> bool {
    let (Ok(current), Ok(latest)) = (Version::parse(current), Version::parse(latest)) else {
        return false;
    };
    if !latest.pre.is_empty() && current.pre.is_empty() {
        return false;
    }
    latest > current
}
