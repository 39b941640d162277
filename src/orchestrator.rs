//! Run orchestration
//!
//! This module provides:
//! - Invocation context detection from the CI environment
//! - Construction of the checker, providers, git and hosting adapters from settings
//! - A single entry point running the reconciliation engine

use crate::checker::{CheckerKind, NcuChecker, RegistryChecker, VersionChecker};
use crate::config::Settings;
use crate::domain::InvocationContext;
use crate::engine::{ConvergenceResult, EngineOptions, ReconciliationEngine};
use crate::error::{AppError, ConfigError};
use crate::git::SystemGit;
use crate::hosting::{context_from_env, DisconnectedHosting, GitHubClient, HostingClient};
use crate::http::HttpClient;
use crate::manifest::{FsManifestStore, ManifestStore};
use crate::package_manager::SystemCommandRunner;
use crate::provider::{
    ManifestMutator, ManifestProvider, SingleManifestProvider, WorkspaceProvider,
};
use crate::registry::NpmAdapter;
use std::sync::Arc;
use tracing::{debug, info};

/// Commit id used by dry runs outside CI
const LOCAL_COMMIT: &str = "HEAD";

/// Builds and runs the reconciliation engine for one invocation
pub struct Orchestrator {
    settings: Settings,
    store: Arc<dyn ManifestStore>,
    show_progress: bool,
}

impl Orchestrator {
    /// Create an orchestrator working on the local file system
    pub fn new(settings: Settings) -> Self {
        Self::with_store(settings, Arc::new(FsManifestStore::new()))
    }

    /// Create an orchestrator with a custom manifest store (for testing)
    pub fn with_store(settings: Settings, store: Arc<dyn ManifestStore>) -> Self {
        Self {
            settings,
            store,
            show_progress: false,
        }
    }

    /// Enable or disable progress spinners
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Detect the invocation context from the process environment
    pub fn context(&self) -> Result<InvocationContext, ConfigError> {
        self.context_with(|name| std::env::var(name).ok())
    }

    /// Detect the invocation context through `lookup`.
    ///
    /// Dry runs tolerate a missing commit id so they can run outside CI.
    pub fn context_with<F>(&self, lookup: F) -> Result<InvocationContext, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let commit = self.settings.commit.as_deref();
        let base = self.settings.base.as_deref();
        match context_from_env(&lookup, commit, base) {
            Err(ConfigError::MissingEnv { name: "GITHUB_SHA" }) if self.settings.dry_run => {
                debug!("no commit id in the environment, using {}", LOCAL_COMMIT);
                context_from_env(&lookup, Some(LOCAL_COMMIT), base)
            }
            other => other,
        }
    }

    /// Version checker selected by the settings
    fn version_checker(&self) -> Result<Arc<dyn VersionChecker>, ConfigError> {
        match self.settings.checker {
            CheckerKind::Registry => {
                let client = HttpClient::new().map_err(|e| ConfigError::HttpClient {
                    message: e.to_string(),
                })?;
                let adapter = NpmAdapter::with_base_url(client, &self.settings.registry_url);
                Ok(Arc::new(RegistryChecker::new(
                    Arc::clone(&self.store),
                    Box::new(adapter),
                )))
            }
            CheckerKind::Ncu => Ok(Arc::new(NcuChecker::new())),
        }
    }

    /// Hosting client; dry runs never reach the host and need no credentials
    fn hosting(&self) -> Result<Arc<dyn HostingClient>, ConfigError> {
        if self.settings.dry_run {
            return Ok(Arc::new(DisconnectedHosting));
        }
        let token = self
            .settings
            .access_token
            .as_deref()
            .ok_or(ConfigError::MissingToken)?;
        let repository = self
            .settings
            .repository
            .as_deref()
            .ok_or(ConfigError::MissingEnv {
                name: "GITHUB_REPOSITORY",
            })?;
        Ok(Arc::new(GitHubClient::new(
            &self.settings.api_url,
            repository,
            token,
        )?))
    }

    /// Providers in run order: the root manifest, then workspace members
    fn providers(&self, checker: Arc<dyn VersionChecker>) -> Vec<Box<dyn ManifestProvider>> {
        let mutator = Arc::new(ManifestMutator::new(
            Arc::clone(&self.store),
            self.settings.install,
            Arc::new(SystemCommandRunner::new()),
        ));
        let manifest = &self.settings.manifest;

        vec![
            Box::new(SingleManifestProvider::new(
                manifest.clone(),
                Arc::clone(&checker),
                Arc::clone(&self.store),
                Arc::clone(&mutator),
            )),
            Box::new(WorkspaceProvider::new(
                manifest.clone(),
                checker,
                Arc::clone(&self.store),
                mutator,
            )),
        ]
    }

    /// Build the engine for these settings
    pub fn build_engine(&self) -> Result<ReconciliationEngine, ConfigError> {
        if !self.store.exists(&self.settings.manifest) {
            return Err(ConfigError::ManifestNotFound {
                path: self.settings.manifest.clone(),
            });
        }

        let checker = self.version_checker()?;
        let hosting = self.hosting()?;
        let git = Arc::new(SystemGit::new(self.settings.project_dir()));

        let options = EngineOptions {
            remote: self.settings.remote.clone(),
            identity: self.settings.identity.clone(),
            dry_run: self.settings.dry_run,
            show_progress: self.show_progress,
        };

        Ok(ReconciliationEngine::new(
            self.providers(checker),
            git,
            hosting,
            options,
        ))
    }

    /// Run one invocation
    pub async fn run(&self) -> Result<ConvergenceResult, AppError> {
        let context = self.context()?;
        let engine = self.build_engine()?;
        info!(
            manifest = %self.settings.manifest.display(),
            checker = %self.settings.checker,
            install = %self.settings.install,
            title = %context.title(),
            "starting run"
        );
        engine.run(&context).await
    }
}
