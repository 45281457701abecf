// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Paginated commit fetching
//!
//! This module retrieves the commits of one repository from the GitHub REST
//! API, page by page, using the `reqwest` crate. Pages are requested strictly
//! in sequence because only a page's response tells whether another exists.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::commit::RawCommit;
use crate::error::FetchError;

/// Default GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size the commits endpoint accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Configuration for a [`CommitFetcher`]
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    /// Base URL of the REST API
    pub api_url: String,
    /// Personal access token; requests are unauthenticated without one
    pub token: Option<String>,
    /// Commits per page (1..=100)
    pub per_page: u32,
    /// Value of the `User-Agent` header, which GitHub requires
    pub user_agent: String,
    /// Timeout for each page request
    pub timeout: Duration,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            per_page: MAX_PER_PAGE,
            user_agent: concat!("breakwatch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FetcherOptions {
    /// Use a different API base URL
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Authenticate requests with a token
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the page size, clamped to the range the API accepts
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Check that a repository identifier has the form `owner/name`
///
/// # Errors
///
/// Returns `FetchError::InvalidRepository` otherwise.
pub fn validate_repository(repository: &str) -> Result<(), FetchError> {
    let valid_part = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    match repository.split_once('/') {
        Some((owner, name)) if valid_part(owner) && valid_part(name) => Ok(()),
        _ => Err(FetchError::InvalidRepository {
            repository: repository.to_string(),
        }),
    }
}

/// GitHub error body, e.g. `{"message": "Not Found"}`
#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

/// Client for the GitHub "list commits" endpoint
#[derive(Debug, Clone)]
pub struct CommitFetcher {
    client: Client,
    options: FetcherOptions,
}

impl CommitFetcher {
    /// Create a fetcher with the given options
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the HTTP client cannot be built.
    pub fn new(options: FetcherOptions) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, options })
    }

    /// The options this fetcher was built with
    #[must_use]
    pub fn options(&self) -> &FetcherOptions {
        &self.options
    }

    /// Whether requests carry a credential
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.options.token.is_some()
    }

    /// Start a lazy page cursor over the commits authored since `since`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidRepository` for a malformed identifier.
    pub fn pages(
        &self,
        repository: &str,
        since: DateTime<Utc>,
    ) -> Result<CommitPages<'_>, FetchError> {
        validate_repository(repository)?;
        Ok(CommitPages {
            fetcher: self,
            repository: repository.to_string(),
            since: since.to_rfc3339_opts(SecondsFormat::Secs, true),
            next: Some(1),
            requested: 0,
        })
    }

    /// Fetch every commit of `repository` since `since`
    ///
    /// Pages are appended in arrival order. Any failing page fails the whole
    /// repository; no partial result is returned.
    ///
    /// # Errors
    ///
    /// Returns the first `FetchError` encountered.
    pub async fn fetch(
        &self,
        repository: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RawCommit>, FetchError> {
        let mut pages = self.pages(repository, since)?;
        let mut commits = Vec::new();
        while let Some(page) = pages.next_page().await? {
            commits.extend(page);
        }
        info!(
            repository,
            commits = commits.len(),
            pages = pages.requested(),
            "Fetched commits"
        );
        Ok(commits)
    }

    fn commits_url(&self, repository: &str) -> String {
        format!(
            "{}/repos/{}/commits",
            self.options.api_url.trim_end_matches('/'),
            repository
        )
    }
}

/// Lazy, finite sequence of commit pages for one repository
pub struct CommitPages<'a> {
    fetcher: &'a CommitFetcher,
    repository: String,
    since: String,
    next: Option<u32>,
    requested: u32,
}

impl CommitPages<'_> {
    /// Repository this cursor reads
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Number of page requests issued so far
    #[must_use]
    pub fn requested(&self) -> u32 {
        self.requested
    }

    /// Whether the cursor is exhausted
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.next.is_none()
    }

    /// Request the next page
    ///
    /// Returns `Ok(None)` once a page comes back empty or a previous page had
    /// no `rel="next"` link. After an error the cursor is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` carrying the repository and page index.
    pub async fn next_page(&mut self) -> Result<Option<Vec<RawCommit>>, FetchError> {
        let Some(page) = self.next.take() else {
            return Ok(None);
        };
        self.requested += 1;

        let options = &self.fetcher.options;
        let mut request = self
            .fetcher
            .client
            .get(self.fetcher.commits_url(&self.repository))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .query(&[
                ("since", self.since.clone()),
                ("per_page", options.per_page.to_string()),
                ("page", page.to_string()),
            ]);
        if let Some(ref token) = options.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await.map_err(|source| FetchError::Http {
            repository: self.repository.clone(),
            page,
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(page, status, response).await);
        }

        let has_next = has_next_link(response.headers());
        let body = response.bytes().await.map_err(|source| FetchError::Http {
            repository: self.repository.clone(),
            page,
            source,
        })?;
        let commits: Vec<RawCommit> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                repository: self.repository.clone(),
                page,
                source,
            })?;

        debug!(
            repository = %self.repository,
            page,
            count = commits.len(),
            has_next,
            "Fetched commit page"
        );

        if commits.is_empty() {
            return Ok(None);
        }
        if has_next {
            self.next = Some(page + 1);
        }
        Ok(Some(commits))
    }

    async fn status_error(
        &self,
        page: u32,
        status: StatusCode,
        response: reqwest::Response,
    ) -> FetchError {
        let headers = response.headers();
        let exhausted = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        if exhausted
            && (status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS)
        {
            let reset = headers
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return FetchError::RateLimited {
                repository: self.repository.clone(),
                page,
                reset,
            };
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&text)
            .map(|m| m.message)
            .unwrap_or(text);
        let message = if message.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            message
        };
        FetchError::Status {
            repository: self.repository.clone(),
            page,
            status: status.as_u16(),
            message,
        }
    }
}

/// Whether a `Link` header advertises a `rel="next"` relation
fn has_next_link(headers: &HeaderMap) -> bool {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|part| {
            part.split(';')
                .skip(1)
                .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use similar_asserts::assert_eq;

    fn link_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LINK, HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn test_has_next_link_present() {
        let headers = link_headers(
            r#"<https://api.github.com/repositories/1/commits?page=2>; rel="next", <https://api.github.com/repositories/1/commits?page=5>; rel="last""#,
        );
        assert!(has_next_link(&headers));
    }

    #[test]
    fn test_has_next_link_only_prev() {
        let headers = link_headers(
            r#"<https://api.github.com/repositories/1/commits?page=1>; rel="prev", <https://api.github.com/repositories/1/commits?page=1>; rel="first""#,
        );
        assert!(!has_next_link(&headers));
    }

    #[test]
    fn test_has_next_link_absent() {
        assert!(!has_next_link(&HeaderMap::new()));
    }

    #[test]
    fn test_has_next_link_ignores_next_in_url() {
        let headers = link_headers(r#"<https://example.com/next?rel="next">; rel="last""#);
        assert!(!has_next_link(&headers));
    }

    #[test]
    fn test_validate_repository() {
        assert!(validate_repository("openedx/edx-platform").is_ok());
        assert!(validate_repository("rust-lang/rust.vim").is_ok());
        assert!(validate_repository("openedx").is_err());
        assert!(validate_repository("/edx-platform").is_err());
        assert!(validate_repository("openedx/").is_err());
        assert!(validate_repository("a/b/c").is_err());
        assert!(validate_repository("a b/c").is_err());
    }

    #[test]
    fn test_options_builder() {
        let options = FetcherOptions::default()
            .with_api_url("http://localhost:1234/")
            .with_token(Some("secret".to_string()))
            .with_per_page(500);
        assert_eq!(options.api_url, "http://localhost:1234/");
        assert_eq!(options.token.as_deref(), Some("secret"));
        assert_eq!(options.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let options = FetcherOptions::default().with_token(Some(String::new()));
        assert!(options.token.is_none());
        assert_eq!(FetcherOptions::default().with_per_page(0).per_page, 1);
    }

    #[test]
    fn test_commits_url_trims_trailing_slash() {
        let fetcher = CommitFetcher::new(
            FetcherOptions::default().with_api_url("http://localhost:1234/"),
        )
        .expect("client");
        assert_eq!(
            fetcher.commits_url("o/r"),
            "http://localhost:1234/repos/o/r/commits"
        );
    }

    #[test]
    fn test_pages_rejects_invalid_repository() {
        let fetcher = CommitFetcher::new(FetcherOptions::default()).expect("client");
        let result = fetcher.pages("not-a-repo", Utc::now());
        assert!(matches!(result, Err(FetchError::InvalidRepository { .. })));
    }
}
