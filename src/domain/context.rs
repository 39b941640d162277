//! Invocation context and deterministic reconciliation keys
//!
//! Every run recomputes the same branch name and title from the commit it
//! was started for. Finding existing upstream state by those keys is the
//! only thing that keeps repeated runs from creating duplicates.

use serde::Serialize;

/// Commit message used for every dependency update commit
pub const COMMIT_MESSAGE: &str = "outdater: Update dependencies";

/// Prefix of every update branch
const BRANCH_PREFIX: &str = "dependencies-update-";

/// Branch name for updates found on the given commit
pub fn branch_name(commit_id: &str) -> String {
    format!("{}{}", BRANCH_PREFIX, commit_id)
}

/// Title of the tracking comment inside a pull request
pub fn pull_request_title(number: u64) -> String {
    format!("Update dependencies for pull request #{}", number)
}

/// Title of the update pull request opened for a commit
pub fn commit_title(commit_id: &str) -> String {
    format!("Update dependencies for {}", commit_id)
}

/// What triggered this invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationEvent {
    /// Running inside a pull request; the number may be missing from the payload
    PullRequest { number: Option<u64> },
    /// Any other trigger (schedule, push, manual dispatch)
    Scheduled { event_name: String },
}

/// Everything the engine needs to know about where it is running
///
/// Built once at the process boundary and passed down by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationContext {
    /// Trigger of this run
    pub event: InvocationEvent,
    /// Commit the run was started for
    pub commit_id: String,
    /// Branch pull requests are opened against
    pub base_ref: String,
}

impl InvocationContext {
    /// Context for a run inside a pull request
    pub fn pull_request(
        number: Option<u64>,
        commit_id: impl Into<String>,
        base_ref: impl Into<String>,
    ) -> Self {
        Self {
            event: InvocationEvent::PullRequest { number },
            commit_id: commit_id.into(),
            base_ref: base_ref.into(),
        }
    }

    /// Context for a scheduled (or otherwise non pull request) run
    pub fn scheduled(
        event_name: impl Into<String>,
        commit_id: impl Into<String>,
        base_ref: impl Into<String>,
    ) -> Self {
        Self {
            event: InvocationEvent::Scheduled {
                event_name: event_name.into(),
            },
            commit_id: commit_id.into(),
            base_ref: base_ref.into(),
        }
    }

    /// Returns true if the run happens inside a pull request
    pub fn is_pull_request(&self) -> bool {
        matches!(self.event, InvocationEvent::PullRequest { .. })
    }

    /// Pull request number, if this is a pull request run and the payload had one
    pub fn pull_request_number(&self) -> Option<u64> {
        match self.event {
            InvocationEvent::PullRequest { number } => number,
            InvocationEvent::Scheduled { .. } => None,
        }
    }

    /// Title used for the report and as the upstream search key.
    ///
    /// A pull request run without a number falls back to the commit title.
    pub fn title(&self) -> String {
        match self.pull_request_number() {
            Some(number) => pull_request_title(number),
            None => commit_title(&self.commit_id),
        }
    }
}

/// Upstream object a run must converge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciliationTarget {
    /// The tracking comment of the current pull request
    PullRequestComment { pull_request: u64, title: String },
    /// An update branch and the pull request opened from it
    BranchAndPullRequest { branch: String, title: String },
}

impl ReconciliationTarget {
    /// Computes the target for a context.
    ///
    /// Returns `None` for a pull request run whose number is unknown.
    pub fn for_context(context: &InvocationContext) -> Option<Self> {
        match context.event {
            InvocationEvent::PullRequest { number: Some(number) } => {
                Some(ReconciliationTarget::PullRequestComment {
                    pull_request: number,
                    title: pull_request_title(number),
                })
            }
            InvocationEvent::PullRequest { number: None } => None,
            InvocationEvent::Scheduled { .. } => Some(ReconciliationTarget::BranchAndPullRequest {
                branch: branch_name(&context.commit_id),
                title: commit_title(&context.commit_id),
            }),
        }
    }

    /// Title used as the search key
    pub fn title(&self) -> &str {
        match self {
            ReconciliationTarget::PullRequestComment { title, .. } => title,
            ReconciliationTarget::BranchAndPullRequest { title, .. } => title,
        }
    }
}
