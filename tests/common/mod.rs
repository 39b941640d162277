//! Shared fixtures for integration tests
//!
//! Hand-written fakes for every seam the engine talks through. Each one
//! records its calls so tests can assert on exactly what reached git, the
//! hosting API and the package manager.

#![allow(dead_code)]

use async_trait::async_trait;
use outdater::checker::{Upgrades, VersionChecker};
use outdater::engine::{EngineOptions, ReconciliationEngine};
use outdater::error::{DiscoveryError, GitError, HostingError};
use outdater::git::GitClient;
use outdater::hosting::{
    Comment, CommentPage, HostingClient, NewPullRequest, PageCursor, PullRequestRef,
};
use outdater::manifest::{FsManifestStore, ManifestStore};
use outdater::package_manager::{CommandRunner, InstallResult, InstallStrategy, PackageManager};
use outdater::provider::{
    ManifestMutator, ManifestProvider, SingleManifestProvider, WorkspaceProvider,
};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Git client that records every call and remembers pushed branches
#[derive(Default)]
pub struct RecordingGit {
    pub calls: Mutex<Vec<String>>,
    pub remote_branches: Mutex<BTreeSet<String>>,
    failing: Mutex<Option<String>>,
}

impl RecordingGit {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Make every later call starting with `prefix` fail
    pub fn fail_on(&self, prefix: &str) {
        *self.failing.lock().unwrap() = Some(prefix.to_string());
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Record `call`, failing it if it matches the `fail_on` prefix
    fn record(&self, call: String) -> Result<(), GitError> {
        let fails = matches_prefix(&self.failing, &call);
        self.calls.lock().unwrap().push(call.clone());
        if fails {
            return Err(GitError::command_failed(&[call.as_str()], "simulated failure"));
        }
        Ok(())
    }
}

fn matches_prefix(failing: &Mutex<Option<String>>, call: &str) -> bool {
    failing
        .lock()
        .unwrap()
        .as_deref()
        .is_some_and(|prefix| call.starts_with(prefix))
}

#[async_trait]
impl GitClient for RecordingGit {
    async fn fetch_remote_refs(&self, remote: &str) -> Result<(), GitError> {
        self.record(format!("fetch {}", remote))
    }

    async fn list_local_and_remote_branches(&self) -> Result<BTreeSet<String>, GitError> {
        self.record("branches".to_string())?;
        let mut branches = self.remote_branches.lock().unwrap().clone();
        branches.insert("main".to_string());
        Ok(branches)
    }

    async fn checkout_new_local_branch(&self, name: &str) -> Result<(), GitError> {
        self.record(format!("checkout new {}", name))
    }

    async fn checkout_existing_tracking_branch(
        &self,
        name: &str,
        remote_ref: &str,
    ) -> Result<(), GitError> {
        self.record(format!("checkout existing {} {}", name, remote_ref))
    }

    async fn configure_identity(&self, name: &str, email: &str) -> Result<(), GitError> {
        self.record(format!("identity {} <{}>", name, email))
    }

    async fn stage_all(&self) -> Result<(), GitError> {
        self.record("stage".to_string())
    }

    async fn commit(&self, message: &str) -> Result<bool, GitError> {
        self.record(format!("commit {}", message))?;
        Ok(true)
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.record(format!("push {} {}", remote, branch))?;
        self.remote_branches
            .lock()
            .unwrap()
            .insert(format!("{}/{}", remote, branch));
        Ok(())
    }
}

/// A pull request held by `FakeHosting`
#[derive(Debug, Clone)]
pub struct StoredPullRequest {
    pub number: u64,
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

/// In-memory code host with paginated comments
pub struct FakeHosting {
    pub pull_requests: Mutex<Vec<StoredPullRequest>>,
    pub comments: Mutex<Vec<(u64, Comment)>>,
    pub calls: Mutex<Vec<String>>,
    next_id: Mutex<u64>,
    page_size: usize,
    failing: Mutex<Option<String>>,
}

impl Default for FakeHosting {
    fn default() -> Self {
        Self::with_page_size(100)
    }
}

impl FakeHosting {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            pull_requests: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(100),
            page_size,
            failing: Mutex::new(None),
        }
    }

    /// Make every later call starting with `prefix` fail
    pub fn fail_on(&self, prefix: &str) {
        *self.failing.lock().unwrap() = Some(prefix.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn pull_requests(&self) -> Vec<StoredPullRequest> {
        self.pull_requests.lock().unwrap().clone()
    }

    /// Comments of one pull request, oldest first
    pub fn comments_on(&self, pull_request: u64) -> Vec<Comment> {
        self.comments
            .lock()
            .unwrap()
            .iter()
            .filter(|(pr, _)| *pr == pull_request)
            .map(|(_, comment)| comment.clone())
            .collect()
    }

    /// Seed an open pull request
    pub fn add_pull_request(&self, title: &str) -> u64 {
        let number = self.next_id();
        self.pull_requests.lock().unwrap().push(StoredPullRequest {
            number,
            title: title.to_string(),
            head: String::new(),
            base: "main".to_string(),
            body: String::new(),
        });
        number
    }

    /// Seed a comment
    pub fn add_comment(&self, pull_request: u64, body: &str) -> u64 {
        let id = self.next_id();
        self.comments.lock().unwrap().push((
            pull_request,
            Comment {
                id,
                body: body.to_string(),
            },
        ));
        id
    }

    fn next_id(&self) -> u64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    /// Record `call`, failing it if it matches the `fail_on` prefix
    fn record(&self, call: String) -> Result<(), HostingError> {
        let fails = matches_prefix(&self.failing, &call);
        self.calls.lock().unwrap().push(call.clone());
        if fails {
            return Err(HostingError::request(call, "simulated failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl HostingClient for FakeHosting {
    async fn search_open_pull_requests(
        &self,
        title: &str,
    ) -> Result<Vec<PullRequestRef>, HostingError> {
        self.record(format!("search {}", title))?;
        Ok(self
            .pull_requests()
            .into_iter()
            .filter(|pr| pr.title == title)
            .map(|pr| PullRequestRef {
                number: pr.number,
                title: pr.title,
                html_url: None,
            })
            .collect())
    }

    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef, HostingError> {
        self.record(format!("create_pull_request {}", request.head))?;
        let number = self.next_id();
        self.pull_requests.lock().unwrap().push(StoredPullRequest {
            number,
            title: request.title.clone(),
            head: request.head.clone(),
            base: request.base.clone(),
            body: request.body.clone(),
        });
        Ok(PullRequestRef {
            number,
            title: request.title.clone(),
            html_url: None,
        })
    }

    async fn list_comments_page(
        &self,
        pull_request: u64,
        cursor: Option<PageCursor>,
    ) -> Result<CommentPage, HostingError> {
        let cursor = cursor.unwrap_or_else(PageCursor::first);
        self.record(format!("list_comments {} page {}", pull_request, cursor.page))?;

        let all = self.comments_on(pull_request);
        let start = (cursor.page as usize - 1) * self.page_size;
        let comments: Vec<Comment> = all.iter().skip(start).take(self.page_size).cloned().collect();
        let next = (start + self.page_size < all.len()).then(|| cursor.next());
        Ok(CommentPage { comments, next })
    }

    async fn create_comment(
        &self,
        pull_request: u64,
        body: &str,
    ) -> Result<Comment, HostingError> {
        self.record(format!("create_comment {}", pull_request))?;
        let id = self.add_comment(pull_request, body);
        Ok(Comment {
            id,
            body: body.to_string(),
        })
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<(), HostingError> {
        self.record(format!("update_comment {}", comment_id))?;
        let mut comments = self.comments.lock().unwrap();
        match comments.iter_mut().find(|(_, c)| c.id == comment_id) {
            Some((_, comment)) => {
                comment.body = body.to_string();
                Ok(())
            }
            None => Err(HostingError::request("comments", "no such comment")),
        }
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<(), HostingError> {
        self.record(format!("delete_comment {}", comment_id))?;
        self.comments
            .lock()
            .unwrap()
            .retain(|(_, comment)| comment.id != comment_id);
        Ok(())
    }
}

/// Version checker answering from a fixed table keyed by manifest path
#[derive(Default)]
pub struct TableChecker {
    pub table: HashMap<PathBuf, Upgrades>,
    pub checked: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl VersionChecker for TableChecker {
    async fn check(&self, manifest_path: &Path) -> Result<Upgrades, DiscoveryError> {
        self.checked
            .lock()
            .unwrap()
            .push(manifest_path.to_path_buf());
        Ok(self.table.get(manifest_path).cloned().unwrap_or_default())
    }
}

/// Command runner that records commands instead of running them
#[derive(Default)]
pub struct RecordingRunner {
    pub runs: Mutex<Vec<(String, PathBuf)>>,
    pub fail: bool,
}

impl RecordingRunner {
    pub fn failing() -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn runs(&self) -> Vec<(String, PathBuf)> {
        self.runs.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &[&str], working_dir: &Path) -> InstallResult {
        let command = command.join(" ");
        self.runs
            .lock()
            .unwrap()
            .push((command.clone(), working_dir.to_path_buf()));
        if self.fail {
            InstallResult::failure(working_dir, command, String::new(), "install failed".to_string())
        } else {
            InstallResult::success(working_dir, command, String::new())
        }
    }
}

/// A project on disk plus fakes for everything upstream
pub struct Fixture {
    pub dir: TempDir,
    pub git: Arc<RecordingGit>,
    pub hosting: Arc<FakeHosting>,
    pub runner: Arc<RecordingRunner>,
    pub checker: Arc<TableChecker>,
}

impl Fixture {
    /// Write `files` (relative path, content) and answer the checker with
    /// `upgrades` (relative manifest path, name/version pairs)
    pub fn new(files: &[(&str, &str)], upgrades: &[(&str, &[(&str, &str)])]) -> Self {
        Self::build(files, upgrades, FakeHosting::default(), RecordingRunner::default())
    }

    pub fn build(
        files: &[(&str, &str)],
        upgrades: &[(&str, &[(&str, &str)])],
        hosting: FakeHosting,
        runner: RecordingRunner,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }

        let table = upgrades
            .iter()
            .map(|(path, entries)| {
                let entries = entries
                    .iter()
                    .map(|(name, version)| (name.to_string(), version.to_string()))
                    .collect();
                (dir.path().join(path), entries)
            })
            .collect();

        Self {
            dir,
            git: Arc::new(RecordingGit::default()),
            hosting: Arc::new(hosting),
            runner: Arc::new(runner),
            checker: Arc::new(TableChecker {
                table,
                checked: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Engine with the root manifest and workspace providers, installing with yarn
    pub fn engine(&self, options: EngineOptions) -> ReconciliationEngine {
        self.engine_with_git(options, self.git.clone())
    }

    /// Same as `engine`, driving `git` instead of the recording fake
    pub fn engine_with_git(
        &self,
        options: EngineOptions,
        git: Arc<dyn GitClient>,
    ) -> ReconciliationEngine {
        let store: Arc<dyn ManifestStore> = Arc::new(FsManifestStore::new());
        let runner: Arc<dyn CommandRunner> = self.runner.clone();
        let checker: Arc<dyn VersionChecker> = self.checker.clone();
        let mutator = Arc::new(ManifestMutator::new(
            Arc::clone(&store),
            InstallStrategy::Fixed(PackageManager::Yarn),
            runner,
        ));
        let root = self.path("package.json");

        let providers: Vec<Box<dyn ManifestProvider>> = vec![
            Box::new(SingleManifestProvider::new(
                root.clone(),
                Arc::clone(&checker),
                Arc::clone(&store),
                Arc::clone(&mutator),
            )),
            Box::new(WorkspaceProvider::new(root, checker, store, mutator)),
        ];

        let hosting: Arc<dyn HostingClient> = self.hosting.clone();
        ReconciliationEngine::new(providers, git, hosting, options)
    }
}
