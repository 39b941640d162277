//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout, User-Agent and default headers
//! - Exponential backoff retry logic for idempotent requests (max 3 retries)
//! - Rate limit handling
//!
//! Requests that mutate remote state are sent exactly once: a retried
//! `POST` after a lost response could create a duplicate.

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("outdater/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// Why a request did not produce a usable response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    /// The request timed out
    Timeout,
    /// Connection or protocol error
    Network(String),
    /// Server answered 429 on every attempt
    RateLimited,
    /// Server answered 404
    NotFound,
    /// Server answered another non-success status
    Status { status: u16, body: String },
    /// Body could not be decoded
    Decode(String),
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpFailure::Timeout => write!(f, "request timed out"),
            HttpFailure::Network(msg) => write!(f, "network error: {}", msg),
            HttpFailure::RateLimited => write!(f, "rate limit exceeded"),
            HttpFailure::NotFound => write!(f, "not found"),
            HttpFailure::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            HttpFailure::Decode(msg) => write!(f, "failed to decode response: {}", msg),
        }
    }
}

impl std::error::Error for HttpFailure {}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, HttpFailure> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, HeaderMap::new())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(
        timeout: Duration,
        user_agent: &str,
        default_headers: HeaderMap,
    ) -> Result<Self, HttpFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(default_headers)
            .build()
            .map_err(|e| HttpFailure::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Send an idempotent request, retrying timeouts, network errors and 429s
    /// with exponential backoff.
    ///
    /// `build` is called once per attempt because a `RequestBuilder` cannot
    /// be reused after it was sent.
    pub async fn send_idempotent<F>(&self, build: F) -> Result<Response, HttpFailure>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut last_error = HttpFailure::Network("no attempt made".to_string());
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=MAX_RETRIES {
            match self.execute(build(&self.client)).await {
                Ok(response) => return Ok(response),
                Err(e @ (HttpFailure::Timeout | HttpFailure::Network(_) | HttpFailure::RateLimited)) => {
                    debug!(attempt, error = %e, "request failed, retrying");
                    last_error = e;
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    /// Send a request exactly once
    pub async fn send_once(&self, request: RequestBuilder) -> Result<Response, HttpFailure> {
        self.execute(request).await
    }

    /// GET a URL and decode its JSON body
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<T, HttpFailure> {
        let response = self
            .send_idempotent(|client| client.get(url).headers(headers.clone()))
            .await?;
        decode_json(response).await
    }

    /// Send one request and classify the outcome
    async fn execute(&self, request: RequestBuilder) -> Result<Response, HttpFailure> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpFailure::Timeout
            } else {
                HttpFailure::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(HttpFailure::RateLimited),
            StatusCode::NOT_FOUND => Err(HttpFailure::NotFound),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(HttpFailure::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// Decode a JSON response body
pub async fn decode_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, HttpFailure> {
    response
        .json::<T>()
        .await
        .map_err(|e| HttpFailure::Decode(e.to_string()))
}
