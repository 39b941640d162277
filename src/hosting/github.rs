//! GitHub REST API client and GitHub Actions context
//!
//! API endpoints used:
//! - `GET /search/issues` to find open update pull requests by title
//! - `POST /repos/{owner}/{repo}/pulls` to open one
//! - `GET|POST /repos/{owner}/{repo}/issues/{number}/comments` for tracking comments
//! - `PATCH|DELETE /repos/{owner}/{repo}/issues/comments/{id}`
//!
//! Reads are retried by the shared HTTP client; writes are sent once.

use crate::domain::InvocationContext;
use crate::error::{ConfigError, HostingError};
use crate::hosting::{
    Comment, CommentPage, HostingClient, NewPullRequest, PageCursor, PullRequestRef,
};
use crate::http::{decode_json, HttpClient, HttpFailure, DEFAULT_USER_AGENT};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Public GitHub API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Comments requested per page
const COMMENTS_PER_PAGE: usize = 100;

/// REST API version pinned in every request
const API_VERSION: &str = "2022-11-28";

/// Timeout for API requests
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub client scoped to one repository
pub struct GitHubClient {
    client: HttpClient,
    api_url: String,
    owner: String,
    repo: String,
}

/// Search API response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<PullRequestRef>,
}

impl GitHubClient {
    /// Create a client for `repository` (`owner/name`) authenticated with `token`
    pub fn new(api_url: &str, repository: &str, token: &str) -> Result<Self, ConfigError> {
        let (owner, repo) = parse_repository(repository)?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let client = HttpClient::with_config(API_TIMEOUT, DEFAULT_USER_AGENT, headers)
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
        })
    }

    /// URL of a path under the repository
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repo, path
        )
    }

    /// Search query for open pull requests with `title`
    fn search_query(&self, title: &str) -> String {
        format!(
            "\"{}\" repo:{}/{} is:pr is:open in:title",
            title.replace('"', ""),
            self.owner,
            self.repo
        )
    }

    /// GET a JSON resource, retrying transient failures
    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, HostingError> {
        debug!(url = %url, "GET");
        self.client
            .get_json(url.as_str(), HeaderMap::new())
            .await
            .map_err(|e| hosting_error(e, &Method::GET, url.as_str()))
    }

    /// Send a mutating request exactly once
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, HostingError> {
        debug!(method = %method, url, "sending");
        let mut request = self.client.inner().request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.client
            .send_once(request)
            .await
            .map_err(|e| hosting_error(e, &method, url))
    }
}

#[async_trait]
impl HostingClient for GitHubClient {
    async fn search_open_pull_requests(
        &self,
        title: &str,
    ) -> Result<Vec<PullRequestRef>, HostingError> {
        let endpoint = format!("{}/search/issues", self.api_url);
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("q", self.search_query(title)),
                ("per_page", "100".to_string()),
            ],
        )
        .map_err(|e| HostingError::request(&endpoint, e.to_string()))?;

        let response: SearchResponse = self.get(url).await?;
        // The search is fuzzy; only an exact title is the same key
        Ok(response
            .items
            .into_iter()
            .filter(|item| item.title == title)
            .collect())
    }

    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<PullRequestRef, HostingError> {
        let url = self.repo_url("pulls");
        let body = serde_json::to_value(request)
            .map_err(|e| HostingError::request(&url, e.to_string()))?;
        let response = self.send(Method::POST, &url, Some(body)).await?;
        decode_json(response)
            .await
            .map_err(|e| hosting_error(e, &Method::POST, &url))
    }

    async fn list_comments_page(
        &self,
        pull_request: u64,
        cursor: Option<PageCursor>,
    ) -> Result<CommentPage, HostingError> {
        let cursor = cursor.unwrap_or_else(PageCursor::first);
        let endpoint = self.repo_url(&format!("issues/{}/comments", pull_request));
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("per_page", COMMENTS_PER_PAGE.to_string()),
                ("page", cursor.page.to_string()),
            ],
        )
        .map_err(|e| HostingError::request(&endpoint, e.to_string()))?;

        let comments: Vec<Comment> = self.get(url).await?;
        let next = (comments.len() == COMMENTS_PER_PAGE).then(|| cursor.next());
        Ok(CommentPage { comments, next })
    }

    async fn create_comment(
        &self,
        pull_request: u64,
        body: &str,
    ) -> Result<Comment, HostingError> {
        let url = self.repo_url(&format!("issues/{}/comments", pull_request));
        let response = self
            .send(Method::POST, &url, Some(json!({ "body": body })))
            .await?;
        decode_json(response)
            .await
            .map_err(|e| hosting_error(e, &Method::POST, &url))
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<(), HostingError> {
        let url = self.repo_url(&format!("issues/comments/{}", comment_id));
        self.send(Method::PATCH, &url, Some(json!({ "body": body })))
            .await
            .map(|_| ())
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<(), HostingError> {
        let url = self.repo_url(&format!("issues/comments/{}", comment_id));
        self.send(Method::DELETE, &url, None).await.map(|_| ())
    }
}

/// Split `owner/name`
fn parse_repository(repository: &str) -> Result<(String, String), ConfigError> {
    match repository.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ConfigError::InvalidRepository {
            value: repository.to_string(),
        }),
    }
}

/// Translate a transport failure into a hosting error
fn hosting_error(failure: HttpFailure, method: &Method, url: &str) -> HostingError {
    let status = |status: u16, message: String| HostingError::Status {
        method: method.to_string(),
        url: url.to_string(),
        status,
        message,
    };
    match failure {
        HttpFailure::NotFound => status(404, "Not Found".to_string()),
        HttpFailure::RateLimited => status(429, "rate limit exceeded".to_string()),
        HttpFailure::Status { status: code, body } => status(code, api_message(&body)),
        HttpFailure::Decode(message) => HostingError::invalid_response(url, message),
        other => HostingError::request(url, other.to_string()),
    }
}

/// Pull `message` out of a GitHub error body, or return the body as is
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Build the invocation context from GitHub Actions environment variables.
///
/// `lookup` reads one variable. `commit` and `base` override what the
/// environment says. A pull request event without a readable number yields a
/// context whose number is `None`.
pub fn context_from_env<F>(
    lookup: F,
    commit: Option<&str>,
    base: Option<&str>,
) -> Result<InvocationContext, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    let commit_id = match commit {
        Some(commit) => commit.to_string(),
        None => var("GITHUB_SHA").ok_or(ConfigError::MissingEnv { name: "GITHUB_SHA" })?,
    };

    let base_ref = base
        .map(String::from)
        .or_else(|| var("GITHUB_BASE_REF"))
        .or_else(|| {
            var("GITHUB_REF").and_then(|r| r.strip_prefix("refs/heads/").map(String::from))
        })
        .unwrap_or_else(|| "main".to_string());

    let event_name = var("GITHUB_EVENT_NAME").unwrap_or_else(|| "workflow_dispatch".to_string());
    if !matches!(event_name.as_str(), "pull_request" | "pull_request_target") {
        return Ok(InvocationContext::scheduled(event_name, commit_id, base_ref));
    }

    let number = match var("GITHUB_EVENT_PATH") {
        Some(path) => pull_request_number_from_payload(Path::new(&path))?,
        None => None,
    }
    .or_else(|| var("GITHUB_REF").and_then(|r| pull_request_number_from_ref(&r)));

    Ok(InvocationContext::pull_request(number, commit_id, base_ref))
}

/// Read `pull_request.number` from the webhook payload file
fn pull_request_number_from_payload(path: &Path) -> Result<Option<u64>, ConfigError> {
    let payload_error = |message: String| ConfigError::EventPayload {
        path: path.to_path_buf(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| payload_error(e.to_string()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| payload_error(e.to_string()))?;

    Ok(payload
        .pointer("/pull_request/number")
        .or_else(|| payload.get("number"))
        .and_then(serde_json::Value::as_u64))
}

/// Parse the number out of `refs/pull/<n>/merge`
fn pull_request_number_from_ref(git_ref: &str) -> Option<u64> {
    git_ref
        .strip_prefix("refs/pull/")?
        .split('/')
        .next()?
        .parse()
        .ok()
}
