//! Code hosting capability
//!
//! This module provides:
//! - The `HostingClient` seam for pull requests and their comments
//! - Tracking comment lookup across every comment page
//! - The GitHub REST implementation and GitHub Actions context detection

pub mod github;

pub use github::{context_from_env, GitHubClient, GITHUB_API_URL};

use crate::error::HostingError;
use crate::report::is_report_for;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An open pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Pull request to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    /// Branch holding the changes
    pub head: String,
    /// Branch the changes should land on
    pub base: String,
    pub body: String,
}

/// A comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
}

/// Position of a page in a paginated listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// 1-based page number
    pub page: u32,
}

impl PageCursor {
    /// Cursor of the first page
    pub fn first() -> Self {
        Self { page: 1 }
    }

    /// Cursor of the page after this one
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
        }
    }
}

/// One page of comments and the cursor of the next page, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub next: Option<PageCursor>,
}

/// Pull request and comment operations on the code host
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Open pull requests whose title is exactly `title`
    async fn search_open_pull_requests(
        &self,
        title: &str,
    ) -> Result<Vec<PullRequestRef>, HostingError>;

    /// Open a pull request
    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef, HostingError>;

    /// One page of the comments of a pull request; `None` means the first page
    async fn list_comments_page(
        &self,
        pull_request: u64,
        cursor: Option<PageCursor>,
    ) -> Result<CommentPage, HostingError>;

    /// Add a comment to a pull request
    async fn create_comment(&self, pull_request: u64, body: &str)
        -> Result<Comment, HostingError>;

    /// Replace the body of a comment
    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<(), HostingError>;

    /// Delete a comment
    async fn delete_comment(&self, comment_id: u64) -> Result<(), HostingError>;
}

/// Find the tracking comment for `title` on a pull request.
///
/// Walks every page; a comment past the first page is still found.
pub async fn find_tracking_comment(
    hosting: &dyn HostingClient,
    pull_request: u64,
    title: &str,
) -> Result<Option<Comment>, HostingError> {
    let mut cursor = None;
    loop {
        let page = hosting.list_comments_page(pull_request, cursor).await?;
        debug!(
            pull_request,
            page = cursor.map_or(1, |c: PageCursor| c.page),
            comments = page.comments.len(),
            "scanned comment page"
        );

        if let Some(comment) = page
            .comments
            .into_iter()
            .find(|comment| is_report_for(&comment.body, title))
        {
            return Ok(Some(comment));
        }

        match page.next {
            Some(next) => cursor = Some(next),
            None => return Ok(None),
        }
    }
}

/// Hosting client for runs without credentials. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedHosting;

impl DisconnectedHosting {
    fn unavailable<T>() -> Result<T, HostingError> {
        Err(HostingError::request(
            "(none)",
            "no hosting credentials configured",
        ))
    }
}

#[async_trait]
impl HostingClient for DisconnectedHosting {
    async fn search_open_pull_requests(
        &self,
        _title: &str,
    ) -> Result<Vec<PullRequestRef>, HostingError> {
        Self::unavailable()
    }

    async fn create_pull_request(
        &self,
        _request: &NewPullRequest,
    ) -> Result<PullRequestRef, HostingError> {
        Self::unavailable()
    }

    async fn list_comments_page(
        &self,
        _pull_request: u64,
        _cursor: Option<PageCursor>,
    ) -> Result<CommentPage, HostingError> {
        Self::unavailable()
    }

    async fn create_comment(
        &self,
        _pull_request: u64,
        _body: &str,
    ) -> Result<Comment, HostingError> {
        Self::unavailable()
    }

    async fn update_comment(&self, _comment_id: u64, _body: &str) -> Result<(), HostingError> {
        Self::unavailable()
    }

    async fn delete_comment(&self, _comment_id: u64) -> Result<(), HostingError> {
        Self::unavailable()
    }
}
