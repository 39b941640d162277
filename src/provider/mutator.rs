//! Manifest mutator
//!
//! Applies discovered updates to the manifests they belong to, renders the
//! result for the report and, when asked to, writes it back and runs the
//! package manager's install step.

use crate::domain::{Language, UpdateSuggestion};
use crate::error::ManifestError;
use crate::manifest::{load_package_json, ManifestStore};
use crate::package_manager::{CommandRunner, InstallResult, InstallStrategy};
use crate::provider::{DiscoveryResult, MutationResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Rewrites manifests and runs the post-mutation install step
pub struct ManifestMutator {
    store: Arc<dyn ManifestStore>,
    install: InstallStrategy,
    runner: Arc<dyn CommandRunner>,
    language: Language,
}

impl ManifestMutator {
    /// Create a mutator
    pub fn new(
        store: Arc<dyn ManifestStore>,
        install: InstallStrategy,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            store,
            install,
            runner,
            language: Language::NodeJs,
        }
    }

    /// Apply the updates of `discovery` to every touched manifest.
    ///
    /// Every touched manifest yields one suggestion. When `should_apply` is
    /// false nothing is written. Installing is left to [`Self::install`]: the
    /// result names the directory of `install_root` once anything was
    /// written, so a workspace installs from its root exactly once.
    pub fn apply(
        &self,
        discovery: &DiscoveryResult,
        should_apply: bool,
        install_root: &Path,
    ) -> Result<MutationResult, ManifestError> {
        let mut result = MutationResult::default();

        for path in &discovery.touched {
            let mut manifest = load_package_json(self.store.as_ref(), path)?;
            for update in discovery.updates.iter().filter(|u| u.applies_to(path)) {
                manifest.set_version(&update.name, &update.new_version);
            }
            let rendered = manifest.render();

            if should_apply {
                info!(manifest = %path.display(), "writing updated manifest");
                self.store
                    .write_manifest(path, &format!("{}\n", rendered))?;
                result.install_dir = Some(working_dir(install_root).to_path_buf());
            }

            result.suggestions.push(UpdateSuggestion::new(
                path.clone(),
                self.language.content_type(),
                rendered,
            ));
        }

        Ok(result)
    }

    /// Run the install step in `dir`. `None` when installing is disabled.
    ///
    /// A failed install is logged and returned, never raised.
    pub fn install(&self, dir: &Path) -> Option<InstallResult> {
        let pm = self.install.resolve(dir)?;
        let install = self.runner.run(&pm.install_command(), dir);
        if !install.success {
            error!(
                command = %install.command,
                dir = %dir.display(),
                stderr = %install.stderr.trim(),
                "install failed"
            );
        }
        Some(install)
    }
}

/// Directory a manifest lives in; `.` for a bare file name
fn working_dir(manifest: &Path) -> &Path {
    match manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
