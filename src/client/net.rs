//! Network collaborator for the interactive client.
//!
//! DESIGN
//! ======
//! Components never talk to `reqwest` directly. They hold an
//! `Arc<dyn HelpdeskApi>` so tests can substitute a scripted fake, and
//! every call they make runs inside a `RequestHandle` that owns the spawned
//! task. The handle is where cancellation and an optional bounded wait
//! live; call sites stay the same whether or not a timeout is configured.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx statuses, and bodies that fail to parse all
//! come back as `ApiError`. Callers treat every variant as "the request
//! failed"; the distinction only matters for logging and `retryable()`.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use tokio::task::{AbortHandle, JoinHandle};

use crate::config::ClientConfig;
use crate::routes::auth::{COOKIE_NAME, X_REQUESTED_WITH, XML_HTTP_REQUEST};
use crate::types::{DashboardStats, VoteResult, VoteType};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with HTTP {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request timed out")]
    TimedOut,
    #[error("request cancelled")]
    Cancelled,
    #[error("failed to build http client: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Status { .. } => "E_STATUS",
            Self::Malformed(_) => "E_MALFORMED",
            Self::TimedOut => "E_TIMED_OUT",
            Self::Cancelled => "E_CANCELLED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Whether clicking again has a reasonable chance of succeeding.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::TimedOut | Self::Status { status: 429 | 500..=599 })
    }
}

// =============================================================================
// TICKET ID
// =============================================================================

/// Non-empty ticket identifier as it appears in page markup and URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    /// Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_owned())) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// API TRAIT
// =============================================================================

/// The two endpoints the interactive core depends on.
#[async_trait::async_trait]
pub trait HelpdeskApi: Send + Sync {
    /// `POST /tickets/{id}/vote`.
    async fn submit_vote(&self, ticket_id: &TicketId, vote: VoteType) -> Result<VoteResult, ApiError>;

    /// `GET /dashboard/stats`.
    async fn fetch_stats(&self) -> Result<DashboardStats, ApiError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// `HelpdeskApi` over HTTP. Marks every request as programmatic so the
/// server answers with JSON instead of a rendered page.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    csrf_token: String,
}

impl HttpApi {
    /// Build a client for pages whose cookies are managed elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(config: &ClientConfig, csrf_token: impl Into<String>) -> Result<Self, ApiError> {
        Self::build(config, csrf_token.into(), None)
    }

    /// Build a client that presents `session_token` as the session cookie.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the token is not a valid
    /// header value or the client fails to build.
    pub fn with_session(
        config: &ClientConfig,
        csrf_token: impl Into<String>,
        session_token: &str,
    ) -> Result<Self, ApiError> {
        Self::build(config, csrf_token.into(), Some(session_token))
    }

    fn build(config: &ClientConfig, csrf_token: String, session_token: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUESTED_WITH, HeaderValue::from_static(XML_HTTP_REQUEST));
        if let Some(token) = session_token {
            let cookie = HeaderValue::from_str(&format!("{COOKIE_NAME}={token}"))
                .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
            headers.insert(COOKIE, cookie);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url.clone(), csrf_token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait::async_trait]
impl HelpdeskApi for HttpApi {
    async fn submit_vote(&self, ticket_id: &TicketId, vote: VoteType) -> Result<VoteResult, ApiError> {
        let form = reqwest::multipart::Form::new()
            .text("vote_type", vote.as_str())
            .text("csrf_token", self.csrf_token.clone());

        let response = self
            .http
            .post(self.url(&format!("/tickets/{ticket_id}/vote")))
            .multipart(form)
            .send()
            .await
            .map_err(request_error)?;

        parse_vote_result(&read_success_body(response).await?)
    }

    async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        let response = self
            .http
            .get(self.url("/dashboard/stats"))
            .send()
            .await
            .map_err(request_error)?;

        parse_stats(&read_success_body(response).await?)
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16() });
    }
    response
        .text()
        .await
        .map_err(request_error)
}

/// The client-wide request bound surfaces the same way as a handle timeout.
fn request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::TimedOut
    } else {
        ApiError::Transport(err.to_string())
    }
}

pub(crate) fn parse_vote_result(body: &str) -> Result<VoteResult, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))
}

pub(crate) fn parse_stats(body: &str) -> Result<DashboardStats, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))
}

// =============================================================================
// REQUEST HANDLE
// =============================================================================

/// A spawned request with explicit cancellation and an optional bounded wait.
///
/// No timeout applies unless [`with_timeout`](Self::with_timeout) sets one.
pub struct RequestHandle<T> {
    task: JoinHandle<Result<T, ApiError>>,
    timeout: Option<Duration>,
}

impl<T: Send + 'static> RequestHandle<T> {
    pub fn spawn<F>(request: F) -> Self
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        Self { task: tokio::spawn(request), timeout: None }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Abort the request. A pending [`wait`](Self::wait) resolves to
    /// [`ApiError::Cancelled`].
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Handle that can cancel the request after `self` has moved into `wait`.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }

    /// Wait for the request to settle.
    ///
    /// # Errors
    ///
    /// Returns the request's own error, [`ApiError::TimedOut`] once the
    /// bound elapses, or [`ApiError::Cancelled`] if the task was aborted.
    pub async fn wait(mut self) -> Result<T, ApiError> {
        let joined = match self.timeout {
            Some(limit) => {
                if let Ok(joined) = tokio::time::timeout(limit, &mut self.task).await {
                    joined
                } else {
                    self.task.abort();
                    return Err(ApiError::TimedOut);
                }
            }
            None => (&mut self.task).await,
        };

        match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ApiError::Cancelled),
            Err(e) => Err(ApiError::Transport(format!("request task failed: {e}"))),
        }
    }
}

#[cfg(test)]
#[path = "net_test.rs"]
mod tests;
