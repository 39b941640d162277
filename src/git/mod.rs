//! Git capability
//!
//! This module provides:
//! - The `GitClient` seam the engine drives during convergence
//! - `SystemGit`, an adapter over the `git` binary
//! - Branch switching that reuses an update branch pushed by an earlier run

use crate::error::GitError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// Git operations needed to publish an update branch
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Fetch all refs from `remote`
    async fn fetch_remote_refs(&self, remote: &str) -> Result<(), GitError>;

    /// Local and remote-tracking branch names (`main`, `origin/main`, ...)
    async fn list_local_and_remote_branches(&self) -> Result<BTreeSet<String>, GitError>;

    /// Create `name` from the current HEAD and check it out
    async fn checkout_new_local_branch(&self, name: &str) -> Result<(), GitError>;

    /// Reset `name` to `remote_ref`, track it and check it out.
    ///
    /// Called on a clean working tree, before any manifest is rewritten.
    async fn checkout_existing_tracking_branch(
        &self,
        name: &str,
        remote_ref: &str,
    ) -> Result<(), GitError>;

    /// Set the committer identity for this repository
    async fn configure_identity(&self, name: &str, email: &str) -> Result<(), GitError>;

    /// Stage every change in the working tree
    async fn stage_all(&self) -> Result<(), GitError>;

    /// Commit staged changes. Returns false if nothing was staged.
    async fn commit(&self, message: &str) -> Result<bool, GitError>;

    /// Push `branch` to the branch of the same name on `remote`
    async fn push(&self, remote: &str, branch: &str) -> Result<(), GitError>;
}

/// How the update branch was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchCheckout {
    /// An earlier run had pushed the branch; it is tracked again
    Reused,
    /// The branch did not exist upstream and was created locally
    Created,
}

/// Switch to the update branch, reusing the remote one if it exists.
///
/// Runs before mutation, so the manifests rewritten afterwards are the ones
/// of the update branch.
pub async fn switch_to_branch(
    git: &dyn GitClient,
    remote: &str,
    branch: &str,
) -> Result<BranchCheckout, GitError> {
    git.fetch_remote_refs(remote).await?;
    let branches = git.list_local_and_remote_branches().await?;
    let remote_ref = format!("{}/{}", remote, branch);

    if branches.contains(&remote_ref) {
        info!(branch, remote_ref = %remote_ref, "reusing existing update branch");
        git.checkout_existing_tracking_branch(branch, &remote_ref)
            .await?;
        Ok(BranchCheckout::Reused)
    } else {
        info!(branch, "creating update branch");
        git.checkout_new_local_branch(branch).await?;
        Ok(BranchCheckout::Created)
    }
}

/// Git client backed by the `git` executable
#[derive(Debug, Clone)]
pub struct SystemGit {
    working_dir: PathBuf,
}

impl SystemGit {
    /// Create a client operating on the repository at `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Run git and return its stdout, failing on a non-zero exit
    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(GitError::command_failed(
                args,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run git and return the raw output, whatever the exit status
    async fn output(&self, args: &[&str]) -> Result<std::process::Output, GitError> {
        debug!(args = %args.join(" "), "running git");
        Command::new("git")
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .await
            .map_err(|source| GitError::Spawn {
                args: args.join(" "),
                source,
            })
    }
}

#[async_trait]
impl GitClient for SystemGit {
    async fn fetch_remote_refs(&self, remote: &str) -> Result<(), GitError> {
        self.run(&["fetch", remote]).await.map(|_| ())
    }

    async fn list_local_and_remote_branches(&self) -> Result<BTreeSet<String>, GitError> {
        let stdout = self
            .run(&["branch", "--all", "--format=%(refname:short)"])
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    async fn checkout_new_local_branch(&self, name: &str) -> Result<(), GitError> {
        self.run(&["checkout", "-B", name]).await.map(|_| ())
    }

    async fn checkout_existing_tracking_branch(
        &self,
        name: &str,
        remote_ref: &str,
    ) -> Result<(), GitError> {
        self.run(&["checkout", "-B", name, "--track", remote_ref])
            .await
            .map(|_| ())
    }

    async fn configure_identity(&self, name: &str, email: &str) -> Result<(), GitError> {
        self.run(&["config", "user.name", name]).await?;
        self.run(&["config", "user.email", email]).await?;
        Ok(())
    }

    async fn stage_all(&self) -> Result<(), GitError> {
        self.run(&["add", "--all"]).await.map(|_| ())
    }

    async fn commit(&self, message: &str) -> Result<bool, GitError> {
        // Exit status 0 means the index matches HEAD
        let staged = self.output(&["diff", "--cached", "--quiet"]).await?;
        if staged.status.success() {
            debug!("nothing staged, skipping commit");
            return Ok(false);
        }
        self.run(&["commit", "-m", message]).await?;
        Ok(true)
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(&["push", remote, &format!("{0}:{0}", branch)])
            .await
            .map(|_| ())
    }
}
