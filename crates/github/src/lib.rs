//! TrueTunes GitHub infrastructure adapter.
//!
//! Implements [`pipeline::IssueTracker`] against the GitHub REST API: listing
//! report-issues by label (following `Link` pagination to exhaustion) and
//! closing them with a `state_reason`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. HTTP
//! transport, authentication headers, pagination and payload decoding live
//! here; the [`pipeline`] crate sees only [`pipeline::IssueTracker`] and
//! [`pipeline::TrackerError`].
//!
//! No request is retried: a failed list aborts the run and a failed
//! close is skipped by the caller.

pub mod error;
pub mod pagination;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    IssueNumber, IssueState, IssueTracker, ReportIssue, RepositoryId, Resolution, TrackerError,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LINK};

pub use error::{GithubError, Result};
use types::{CloseIssueRequest, IssueItem};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size the issues endpoint accepts.
const PAGE_SIZE: &str = "100";

const USER_AGENT: &str = concat!("truetunes-votes/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    /// Repository the report-issues live in.
    pub repository: RepositoryId,
    /// Token with `issues: write` on the repository.
    pub token: String,
    /// Upper bound on each request, connect to last byte.
    pub timeout: Duration,
}

impl GithubConfig {
    /// Settings for the public API with a 30 second request timeout.
    pub fn new(repository: RepositoryId, token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            repository,
            token: token.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Issue tracker backed by the GitHub REST API for one repository.
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    repository: RepositoryId,
    token: String,
}

impl GithubClient {
    /// Builds the HTTP client with the API version, accept header, user agent
    /// and timeout from `config`.
    ///
    /// # Errors
    /// Returns [`GithubError::Config`] if the TLS backend cannot be initialised.
    pub fn new(config: GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GithubError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repository: config.repository,
            token: config.token,
        })
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/issues", self.api_url, self.repository)
    }

    /// List every issue with `label` in `state`, oldest first.
    ///
    /// Pull requests are dropped. Pages are requested until the response
    /// carries no `rel="next"` link.
    pub async fn list_report_issues(
        &self,
        label: &str,
        state: IssueState,
    ) -> Result<Vec<ReportIssue>> {
        let mut request = self.client.get(self.issues_url()).query(&[
            ("labels", label),
            ("state", state.as_str()),
            ("per_page", PAGE_SIZE),
            ("sort", "created"),
            ("direction", "asc"),
        ]);
        let mut issues = Vec::new();
        let mut page = 1u32;

        loop {
            let resp = request.bearer_auth(&self.token).send().await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(GithubError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let next = resp
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(pagination::next_page_url);

            let body = resp.text().await?;
            let items: Vec<IssueItem> = serde_json::from_str(&body)?;
            let listed = items.len();
            issues.extend(
                items
                    .into_iter()
                    .filter(|item| !item.is_pull_request())
                    .map(IssueItem::into_report_issue),
            );
            tracing::debug!(page, listed, total = issues.len(), "Fetched issue page");

            match next {
                Some(url) => {
                    request = self.client.get(url);
                    page += 1;
                }
                None => break,
            }
        }

        tracing::info!(
            repository = %self.repository,
            label,
            state = state.as_str(),
            pages = page,
            count = issues.len(),
            "Listed report issues"
        );
        Ok(issues)
    }

    /// Close one issue with the given `state_reason`.
    pub async fn close(&self, issue: IssueNumber, resolution: Resolution) -> Result<()> {
        let url = format!("{}/{}", self.issues_url(), issue.as_u64());
        let resp = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .json(&CloseIssueRequest {
                state: "closed",
                state_reason: resolution.as_str(),
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GithubError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(
            issue = issue.as_u64(),
            resolution = resolution.as_str(),
            "Closed issue"
        );
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn list_issues(
        &self,
        label: &str,
        state: IssueState,
    ) -> std::result::Result<Vec<ReportIssue>, TrackerError> {
        Ok(self.list_report_issues(label, state).await?)
    }

    async fn close_issue(
        &self,
        issue: IssueNumber,
        resolution: Resolution,
    ) -> std::result::Result<(), TrackerError> {
        Ok(self.close(issue, resolution).await?)
    }
}
