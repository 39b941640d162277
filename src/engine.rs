//! Reconciliation engine
//!
//! Drives one invocation through `Discover → Mutate → Converge`:
//! - Discover: every provider in order, updates concatenated
//! - Mutate: rewrite touched manifests; persist only outside pull requests.
//!   A scheduled run switches to the update branch first, so the rewrite
//!   lands on top of whatever an earlier run already pushed there.
//! - Converge: make the branch, pull request and tracking comment upstream
//!   match what was discovered
//!
//! Nothing is remembered between runs. Every upstream object is found again
//! by the deterministic keys derived from the invocation context, which is
//! what makes a second run update instead of duplicate.

use crate::domain::{
    InvocationContext, ReconciliationTarget, Update, UpdateSuggestion, COMMIT_MESSAGE,
};
use crate::error::AppError;
use crate::git::{switch_to_branch, BranchCheckout, GitClient};
use crate::hosting::{find_tracking_comment, HostingClient, NewPullRequest};
use crate::package_manager::InstallResult;
use crate::progress::Progress;
use crate::provider::ManifestProvider;
use crate::report::render_report;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default git remote
pub const DEFAULT_REMOTE: &str = "origin";

/// Identity used for update commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "github-actions[bot]".to_string(),
            email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Remote the update branch is fetched from and pushed to
    pub remote: String,
    /// Committer identity
    pub identity: CommitIdentity,
    /// Preview only: nothing is written and nothing upstream is touched
    pub dry_run: bool,
    /// Show spinners
    pub show_progress: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            identity: CommitIdentity::default(),
            dry_run: false,
            show_progress: false,
        }
    }
}

/// What happened to the tracking comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CommentAction {
    Created { id: u64 },
    Updated { id: u64 },
    Deleted { id: u64 },
    /// No updates and no comment
    Unchanged,
}

/// Upstream outcome of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Convergence {
    /// Pull request run: the tracking comment was reconciled
    Comment {
        pull_request: u64,
        action: CommentAction,
    },
    /// Scheduled run: a new pull request was opened from the update branch
    PullRequestOpened {
        number: u64,
        branch: String,
        checkout: BranchCheckout,
    },
    /// Scheduled run: an open pull request already existed; its tracking
    /// comment was reconciled
    ExistingPullRequest {
        number: u64,
        action: CommentAction,
        checkout: Option<BranchCheckout>,
    },
    /// Scheduled run without updates or pull request
    NothingToDo,
    /// Converge did not run
    Skipped { reason: String },
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceResult {
    pub title: String,
    pub updates: Vec<Update>,
    pub suggestions: Vec<UpdateSuggestion>,
    pub installs: Vec<InstallResult>,
    #[serde(skip)]
    pub report: String,
    pub convergence: Convergence,
}

impl ConvergenceResult {
    /// Returns true if any install step failed
    pub fn has_install_failures(&self) -> bool {
        self.installs.iter().any(|install| !install.success)
    }
}

/// The reconciliation engine
pub struct ReconciliationEngine {
    providers: Vec<Box<dyn ManifestProvider>>,
    git: Arc<dyn GitClient>,
    hosting: Arc<dyn HostingClient>,
    options: EngineOptions,
}

impl ReconciliationEngine {
    /// Create an engine. Providers run in the given order.
    pub fn new(
        providers: Vec<Box<dyn ManifestProvider>>,
        git: Arc<dyn GitClient>,
        hosting: Arc<dyn HostingClient>,
        options: EngineOptions,
    ) -> Self {
        Self {
            providers,
            git,
            hosting,
            options,
        }
    }

    /// Run one invocation to completion
    pub async fn run(&self, context: &InvocationContext) -> Result<ConvergenceResult, AppError> {
        let mut progress = Progress::new(self.options.show_progress);
        let title = context.title();

        // Discover
        progress.phase("Discovering updates...");
        let mut discoveries = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            progress.set_message(&format!("Discovering updates ({})...", provider.name()));
            let discovery = provider.discover_updates().await?;
            info!(
                provider = provider.name(),
                updates = discovery.updates.len(),
                manifests = discovery.touched.len(),
                "discovery finished"
            );
            discoveries.push(discovery);
        }
        let updates: Vec<Update> = discoveries
            .iter()
            .flat_map(|d| d.updates.iter().cloned())
            .collect();

        let should_apply = !context.is_pull_request() && !self.options.dry_run;
        let checkout = match ReconciliationTarget::for_context(context) {
            Some(ReconciliationTarget::BranchAndPullRequest { branch, .. })
                if should_apply && !updates.is_empty() =>
            {
                progress.phase("Switching to update branch...");
                let remote = &self.options.remote;
                Some(switch_to_branch(self.git.as_ref(), remote, &branch).await?)
            }
            _ => None,
        };

        // Mutate
        progress.phase("Applying updates...");
        let mut suggestions = Vec::new();
        let mut pending: Vec<(&dyn ManifestProvider, PathBuf)> = Vec::new();
        for (provider, discovery) in self.providers.iter().zip(&discoveries) {
            if discovery.is_empty() {
                continue;
            }
            let mutation = provider.apply_mutation(discovery, should_apply)?;
            suggestions.extend(mutation.suggestions);
            if let Some(dir) = mutation.install_dir {
                if !pending.iter().any(|(_, seen)| *seen == dir) {
                    pending.push((provider.as_ref(), dir));
                }
            }
        }

        // One install per directory, after every manifest is written
        let installs: Vec<InstallResult> = pending
            .into_iter()
            .filter_map(|(provider, dir)| provider.install(&dir))
            .collect();

        let report = render_report(&title, &updates, &suggestions);

        // Converge
        progress.phase("Reconciling upstream state...");
        let convergence = if self.options.dry_run {
            info!("dry run, skipping upstream reconciliation");
            Convergence::Skipped {
                reason: "dry run".to_string(),
            }
        } else {
            self.converge(context, &report, !updates.is_empty(), checkout)
                .await?
        };
        progress.finish_and_clear();

        Ok(ConvergenceResult {
            title,
            updates,
            suggestions,
            installs,
            report,
            convergence,
        })
    }

    /// Bring upstream state in line with the report
    async fn converge(
        &self,
        context: &InvocationContext,
        report: &str,
        has_updates: bool,
        checkout: Option<BranchCheckout>,
    ) -> Result<Convergence, AppError> {
        match ReconciliationTarget::for_context(context) {
            None => {
                warn!("running in a pull request but its number is unavailable, skipping comment");
                Ok(Convergence::Skipped {
                    reason: "pull request number unavailable".to_string(),
                })
            }
            Some(ReconciliationTarget::PullRequestComment {
                pull_request,
                title,
            }) => {
                let action = self
                    .reconcile_comment(pull_request, &title, report, has_updates)
                    .await?;
                Ok(Convergence::Comment {
                    pull_request,
                    action,
                })
            }
            Some(ReconciliationTarget::BranchAndPullRequest { branch, title }) => {
                self.converge_branch(context, &branch, &title, report, checkout)
                    .await
            }
        }
    }

    /// Scheduled run: publish the branch, then open or reuse the pull request.
    ///
    /// `checkout` is set when the run had updates and already switched to
    /// the update branch before mutating.
    async fn converge_branch(
        &self,
        context: &InvocationContext,
        branch: &str,
        title: &str,
        report: &str,
        checkout: Option<BranchCheckout>,
    ) -> Result<Convergence, AppError> {
        let has_updates = checkout.is_some();
        if has_updates {
            self.commit_and_push(branch).await?;
        }

        let open = self.hosting.search_open_pull_requests(title).await?;
        if let Some(existing) = open.first() {
            info!(number = existing.number, "update pull request already open");
            let action = self
                .reconcile_comment(existing.number, title, report, has_updates)
                .await?;
            return Ok(Convergence::ExistingPullRequest {
                number: existing.number,
                action,
                checkout,
            });
        }

        let Some(checkout) = checkout else {
            info!("no updates and no open pull request");
            return Ok(Convergence::NothingToDo);
        };

        let created = self
            .hosting
            .create_pull_request(&NewPullRequest {
                title: title.to_string(),
                head: branch.to_string(),
                base: context.base_ref.clone(),
                body: report.to_string(),
            })
            .await?;
        info!(number = created.number, branch, "opened update pull request");

        Ok(Convergence::PullRequestOpened {
            number: created.number,
            branch: branch.to_string(),
            checkout,
        })
    }

    /// Commit the mutated manifests on the update branch and push it
    async fn commit_and_push(&self, branch: &str) -> Result<(), AppError> {
        let remote = &self.options.remote;
        let identity = &self.options.identity;
        self.git
            .configure_identity(&identity.name, &identity.email)
            .await?;
        self.git.stage_all().await?;
        if !self.git.commit(COMMIT_MESSAGE).await? {
            debug!(branch, "branch already holds these updates");
        }
        self.git.push(remote, branch).await?;
        info!(branch, remote = %remote, "pushed update branch");
        Ok(())
    }

    /// Create, update or delete the tracking comment for `title`
    pub async fn reconcile_comment(
        &self,
        pull_request: u64,
        title: &str,
        report: &str,
        has_updates: bool,
    ) -> Result<CommentAction, AppError> {
        let existing = find_tracking_comment(self.hosting.as_ref(), pull_request, title).await?;

        let action = match (existing, has_updates) {
            (Some(comment), false) => {
                self.hosting.delete_comment(comment.id).await?;
                CommentAction::Deleted { id: comment.id }
            }
            (Some(comment), true) => {
                self.hosting.update_comment(comment.id, report).await?;
                CommentAction::Updated { id: comment.id }
            }
            (None, true) => {
                let comment = self.hosting.create_comment(pull_request, report).await?;
                CommentAction::Created { id: comment.id }
            }
            (None, false) => CommentAction::Unchanged,
        };
        info!(pull_request, ?action, "tracking comment reconciled");
        Ok(action)
    }
}
